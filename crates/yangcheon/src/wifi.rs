//! Classroom WiFi helper.
//!
//! Every homeroom has a hidden access point named after it; special rooms
//! have their own. This module knows the credentials and builds the network
//! suggestion plus the message shown for each suggestion outcome.

use crate::schedule::GradeClass;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Homeroom numbers as they appear in timetables, e.g. "203" for 2-3.
static HOMEROOM_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([1-3])(0[1-9]|1[01])$").unwrap());

/// Access point of a special room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpecialRoom {
    pub name: &'static str,
    pub ssid: &'static str,
    pub password: &'static str,
}

const fn room(name: &'static str, ssid: &'static str, password: &'static str) -> SpecialRoom {
    SpecialRoom {
        name,
        ssid,
        password,
    }
}

pub const SPECIAL_ROOMS: [SpecialRoom; 14] = [
    room("화학생명실", "화학생명실", "yangcheon401"),
    room("홈베이스A/B", "홈베이스", "yangcheon402"),
    room("음악실", "음악실", "yangcheon403"),
    room("소강당", "소강당", "yangcheon404"),
    room("미술실", "미술실", "yangcheon405"),
    room("물리지학실", "물리지학실", "yangcheon406"),
    room("멀티스튜디오", "멀티스튜디오", "yangcheon407"),
    room("다목적실A/B", "다목적실AB", "yangcheon408"),
    room("꿈담카페A", "꿈담카페A", "yangcheon409"),
    room("꿈담카페B", "꿈담카페B", "yangcheon410"),
    room("도서실", "도서실", "yangcheon411"),
    room("세미나실", "세미나실", "yangcheon412"),
    room("상록실", "상록실", "yangcheon413"),
    room("senWiFi_Free", "senWiFi_Free", "888884444g"),
];

/// Looks up a special room by name.
///
/// Exact names win. Otherwise a name containing the part of a room name
/// before `/` ("홈베이스B" for "홈베이스A/B") or contained in a room name
/// matches, first table entry first. A blank name matches nothing.
pub fn find_room(name: &str) -> Option<&'static SpecialRoom> {
    if name.trim().is_empty() {
        return None;
    }

    SPECIAL_ROOMS
        .iter()
        .find(|room| room.name == name)
        .or_else(|| {
            SPECIAL_ROOMS.iter().find(|room| {
                let stem = room.name.split('/').next().unwrap_or(room.name);
                name.contains(stem) || room.name.contains(name)
            })
        })
}

/// Returns true if `classroom` names a special room with its own network.
pub fn is_special_room(classroom: &str) -> bool {
    let name = classroom.trim();

    if name.chars().count() == 3 && name.parse::<i32>().is_ok() {
        return false;
    }
    if name.contains('T') {
        return false;
    }
    find_room(name).is_some()
}

/// Network to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WifiTarget {
    RegularClassroom(GradeClass),
    SpecialRoom(&'static SpecialRoom),
}

impl WifiTarget {
    /// Resolves a room string from a timetable cell.
    ///
    /// Homeroom numbers ("203") map to that homeroom's access point; other
    /// names go through the special-room table.
    pub fn from_room(room: &str) -> Option<Self> {
        let room = room.trim();

        if let Some(caps) = HOMEROOM_NUMBER.captures(room) {
            let grade = caps[1].parse().ok()?;
            let class = caps[2].parse().ok()?;
            return GradeClass::new(grade, class).map(WifiTarget::RegularClassroom);
        }

        if is_special_room(room) {
            return find_room(room).map(WifiTarget::SpecialRoom);
        }
        None
    }

    pub fn display_name(&self) -> String {
        match self {
            WifiTarget::RegularClassroom(gc) => format!("{}학년 {}반 교실", gc.grade(), gc.class()),
            WifiTarget::SpecialRoom(room) => room.name.to_string(),
        }
    }

    pub fn ssid(&self) -> String {
        match self {
            WifiTarget::RegularClassroom(gc) => format!("{}-{}", gc.grade(), gc.class()),
            WifiTarget::SpecialRoom(room) => room.ssid.to_string(),
        }
    }

    pub fn password(&self) -> String {
        match self {
            WifiTarget::RegularClassroom(gc) => format!("yangcheon{}{:02}", gc.grade(), gc.class()),
            WifiTarget::SpecialRoom(room) => room.password.to_string(),
        }
    }

    pub fn suggestion(&self) -> WifiSuggestion {
        WifiSuggestion {
            ssid: self.ssid(),
            wpa2_passphrase: self.password(),
            hidden_ssid: true,
            app_interaction_required: true,
        }
    }
}

/// A network suggestion as handed to the platform WiFi service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WifiSuggestion {
    pub ssid: String,
    pub wpa2_passphrase: String,
    pub hidden_ssid: bool,
    pub app_interaction_required: bool,
}

/// Outcome reported by the platform for a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionStatus {
    Success,
    Duplicate,
    AppDisallowed,
    Internal,
    ExceedsMaxPerApp,
    WifiDisabled,
    /// Any other status code, or the request threw
    Failed,
}

impl SuggestionStatus {
    /// Maps an Android `STATUS_NETWORK_SUGGESTIONS_*` code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => SuggestionStatus::Success,
            1 => SuggestionStatus::Internal,
            2 => SuggestionStatus::AppDisallowed,
            3 => SuggestionStatus::Duplicate,
            4 => SuggestionStatus::ExceedsMaxPerApp,
            _ => SuggestionStatus::Failed,
        }
    }
}

/// What the user is told after a suggestion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WifiConnectionResult {
    pub is_success: bool,
    pub message: String,
    pub target: WifiTarget,
}

impl WifiConnectionResult {
    pub fn new(target: WifiTarget, status: SuggestionStatus) -> Self {
        let ssid = target.ssid();
        let (is_success, message) = match status {
            SuggestionStatus::Success => (
                true,
                format!(
                    "WiFi 추천이 완료되었습니다.\nWiFi 설정에서 '양천고라이프 앱을 통해 추천됨' 항목을 찾아 연결해주세요.\n연결할 네트워크: {ssid}"
                ),
            ),
            SuggestionStatus::Duplicate => (
                true,
                format!(
                    "이미 추천된 네트워크입니다.\nWiFi 설정에서 '양천고라이프 앱을 통해 추천됨' 또는 '{ssid}' 네트워크를 찾아 연결해주세요."
                ),
            ),
            SuggestionStatus::AppDisallowed => (
                false,
                format!(
                    "앱의 WiFi 권한이 제한되어 있습니다.\n설정 > 앱 > 양천고라이프 > 권한에서 WiFi 권한을 허용하거나 '{ssid}'에 수동으로 연결해주세요."
                ),
            ),
            SuggestionStatus::Internal => (
                false,
                "내부 오류가 발생했습니다.\n다시 시도해주세요.".to_string(),
            ),
            SuggestionStatus::ExceedsMaxPerApp => {
                (false, "최대 네트워크 추천 수를 초과했습니다.".to_string())
            }
            SuggestionStatus::WifiDisabled => {
                (false, "WiFi가 비활성화되어 있습니다. WiFi를 켜주세요.".to_string())
            }
            SuggestionStatus::Failed => (
                false,
                format!(
                    "WiFi 추천에 실패했습니다.\nWiFi 설정에서 '{ssid}'에 직접 연결해주세요.\n비밀번호: {}",
                    target.password()
                ),
            ),
        };

        Self {
            is_success,
            message,
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classroom(grade: u8, class: u8) -> WifiTarget {
        WifiTarget::RegularClassroom(GradeClass::new(grade, class).unwrap())
    }

    #[test]
    fn test_regular_classroom_credentials() {
        let target = classroom(2, 3);
        assert_eq!(target.ssid(), "2-3");
        assert_eq!(target.password(), "yangcheon203");
        assert_eq!(target.display_name(), "2학년 3반 교실");
        assert_eq!(classroom(1, 11).password(), "yangcheon111");
    }

    #[test]
    fn test_find_room() {
        assert_eq!(find_room("음악실").unwrap().password, "yangcheon403");
        assert_eq!(find_room("홈베이스B").unwrap().ssid, "홈베이스");
        assert_eq!(find_room("다목적실A").unwrap().ssid, "다목적실AB");
        assert_eq!(find_room("꿈담카페B").unwrap().password, "yangcheon410");
        assert!(find_room("운동장").is_none());
    }

    #[test]
    fn test_blank_room_is_unknown() {
        for blank in ["", " ", "\t \n"] {
            assert!(find_room(blank).is_none(), "{blank:?}");
            assert!(!is_special_room(blank), "{blank:?}");
            assert_eq!(WifiTarget::from_room(blank), None, "{blank:?}");
        }
    }

    #[test]
    fn test_is_special_room() {
        assert!(!is_special_room("203"));
        assert!(!is_special_room(" 311 "));
        assert!(!is_special_room("T12"));
        assert!(is_special_room("멀티스튜디오"));
        assert!(is_special_room(" 다목적실B "));
        assert!(!is_special_room("운동장"));
    }

    #[test]
    fn test_target_from_room() {
        assert_eq!(WifiTarget::from_room("203"), Some(classroom(2, 3)));
        assert_eq!(WifiTarget::from_room("311"), Some(classroom(3, 11)));
        assert_eq!(WifiTarget::from_room("412"), None);
        assert_eq!(WifiTarget::from_room("212"), None);

        let target = WifiTarget::from_room("홈베이스B").unwrap();
        assert_eq!(target.ssid(), "홈베이스");
        assert_eq!(target.display_name(), "홈베이스A/B");
    }

    #[test]
    fn test_suggestion_shape() {
        let suggestion = classroom(3, 1).suggestion();
        assert_eq!(suggestion.ssid, "3-1");
        assert_eq!(suggestion.wpa2_passphrase, "yangcheon301");
        assert!(suggestion.hidden_ssid);
        assert!(suggestion.app_interaction_required);
    }

    #[test]
    fn test_connection_results() {
        let target = classroom(2, 3);

        assert!(WifiConnectionResult::new(target, SuggestionStatus::from_code(0)).is_success);
        assert!(WifiConnectionResult::new(target, SuggestionStatus::from_code(3)).is_success);
        assert!(!WifiConnectionResult::new(target, SuggestionStatus::from_code(2)).is_success);

        let failed = WifiConnectionResult::new(target, SuggestionStatus::from_code(99));
        assert!(!failed.is_success);
        assert!(failed.message.contains("yangcheon203"));
        assert!(failed.message.contains("2-3"));
    }
}
