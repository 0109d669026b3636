//! Elective catalogs offered in the selection screens.
//!
//! Students pick one elective per "탐구" placeholder from a flat list. Teachers
//! pick, per class-group token ("A 반" ..), the `"subject/room"` they teach
//! in that slot.

use crate::schedule::NO_SELECTION;

/// Choices for the student "탐구B/C/D" placeholders.
///
/// These are labels only. A stored override replaces a timetable cell only
/// when it reads `"subject/room"`, so a bare label leaves the cell as served.
pub const STUDENT_ELECTIVES: [&str; 13] = [
    "없음",
    "물리",
    "화학",
    "생명과학",
    "지구과학",
    "윤사",
    "정치와 법",
    "경제",
    "세계사",
    "한국지리",
    "탐구B",
    "탐구C",
    "탐구D",
];

/// Class-group tabs of the teacher selection screen.
pub const CLASS_GROUPS: [&str; 3] = ["h반", "t반", "나머지반"];

/// Class-group tokens of a group in a grade.
pub fn group_tokens(grade: u8, group: &str) -> &'static [&'static str] {
    match (grade, group) {
        (2, "h반") => &["A 반", "B 반", "C 반", "D 반"],
        (2, "t반") => &["E 반", "F 반", "G 반", "H 반"],
        (2, "나머지반") => &["I 반", "J 반", "K 반", "L 반", "M 반", "N 반"],
        (3, "h반") => &["A 반", "B 반", "C 반", "G 반", "H 반", "I 반"],
        (3, "t반") => &["D 반", "E 반", "F 반", "J 반", "K 반", "L 반", "M 반"],
        (3, "나머지반") => &["N 반", "O 반"],
        _ => &[],
    }
}

/// Every token of a grade, in tab order.
pub fn grade_tokens(grade: u8) -> impl Iterator<Item = &'static str> {
    CLASS_GROUPS
        .iter()
        .flat_map(move |group| group_tokens(grade, group).iter().copied())
}

fn grade_two_options(token: &str) -> &'static [&'static str] {
    match token {
        "A 반" | "B 반" => &["물리I/202", "생명I/204", "여지/201", "지구I/205", "화학I/203"],
        "C 반" => &["물리I/202", "여지/201", "지구I/205", "화학I/203"],
        "D 반" => &["물리I/202", "생명I/204", "여지/201", "지구I/205", "화학I/210"],
        "E 반" | "F 반" => &[
            "물리I/209",
            "생활과학/211",
            "여지/다목적실A",
            "윤사/208",
            "정법/207",
            "지구I/210",
            "한지/206",
        ],
        "G 반" => &[
            "경제/209",
            "생명I/211",
            "생활과학/다목적실A",
            "세계사/206",
            "윤사/208",
            "정법/207",
            "화학I/210",
        ],
        "H 반" => &[
            "경제/209",
            "생명I/211",
            "생활과학/207",
            "세계사/206",
            "여지/다목적실A",
            "윤사/208",
        ],
        "I 반" => &["기하/207", "심화국어/206"],
        "J 반" => &["기하/209", "심화국어/208", "영어문화/다목적실B"],
        "K 반" => &["기하/211", "심화국어/홈베이스B", "영어문화/210"],
        "L 반" => &["일본어I/206", "중국어I/207"],
        "M 반" => &["일본어I/208", "중국어I/209"],
        "N 반" => &["일본어I/210", "중국어I/다목적실B"],
        _ => &[],
    }
}

fn grade_three_options(token: &str) -> &'static [&'static str] {
    match token {
        "A 반" => &[
            "과학사/꿈담카페B",
            "물리/302",
            "사문/304",
            "사문탐/303",
            "생명/305",
            "세지/306",
            "지구/301",
        ],
        "B 반" => &[
            "과학사/꿈담카페B",
            "물리/302",
            "사문/305",
            "사문탐/306",
            "생윤/301",
            "지구/303",
            "화학/304",
        ],
        "C 반" => &["물리/302", "사문/305", "사문탐/303", "생명/306", "생윤/301", "화학/304"],
        "D 반" => &["과학사/홈베이스B", "사문탐/309", "생명/310", "생윤/308", "세지/307", "지구/311"],
        "E 반" => &["과학사/홈베이스B", "물리/310", "사문/308", "사문탐/309", "생윤/307", "지구/311"],
        "F 반" => &["동아사/홈베이스B", "물리/309", "사문/308", "생명/310", "지구/311", "화학/307"],
        "G 반" => &["고전읽기/301", "미적분/302", "수과탐/303", "영독작/305", "AI수학/304", "진로영어/306"],
        "H 반" => &[
            "고전읽기/301",
            "미적분/302",
            "수과탐/303",
            "영독작/305",
            "영어회화/304",
            "진로영어H1/306",
            "진로영어H2/꿈담카페B",
        ],
        "I 반" => &[
            "경제수학/301",
            "미적분I1/302",
            "미적분I2/304",
            "수과탐/303",
            "영독작/305",
            "AI수학/꿈담카페B",
            "진로영어/306",
        ],
        "J 반" => &["미적분/310", "수과탐/309", "영독작/307", "영어회화/308", "진로영어/311"],
        "K 반" => &["경제수학/308", "미적분/309", "영독작/310", "AI수학/307", "진로영어/311"],
        "L 반" => &["고전읽기/311", "미적분/310", "수과탐/309", "영독작/308", "AI수학/홈베이스B", "확통/307"],
        "M 반" => &["고전읽기/308", "미적분/309", "수과탐/310", "AI수학/홈베이스B", "진로영어/311", "확통/307"],
        "N 반" => &["언매/307", "화작N1/308", "화작N2/홈베이스B"],
        "O 반" => &["언매/311", "화작/310"],
        _ => &[],
    }
}

/// Options a teacher can pick for `token` in `grade`, led by "선택 없음".
///
/// Unknown tokens yield only the no-selection entry.
pub fn teacher_options(grade: u8, token: &str) -> Vec<&'static str> {
    let options: &[&str] = match grade {
        2 => grade_two_options(token),
        3 => grade_three_options(token),
        _ => &[],
    };

    std::iter::once(NO_SELECTION[1])
        .chain(options.iter().copied())
        .collect()
}
