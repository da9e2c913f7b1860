//! Device classification

use serde::{Deserialize, Serialize};

/// User-agent fragments that mark a handheld device (matched case-insensitively)
const MOBILE_MARKERS: [&str; 4] = ["iphone", "ipad", "ipod", "android"];

/// Mobile vs. desktop classification, read once when the viewer is created.
///
/// Classification is best effort; it only tunes framing factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub is_mobile: bool,
}

impl DeviceProfile {
    pub const DESKTOP: Self = Self { is_mobile: false };
    pub const MOBILE: Self = Self { is_mobile: true };

    /// Classify from a user-agent style string
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        Self {
            is_mobile: MOBILE_MARKERS.iter().any(|marker| ua.contains(marker)),
        }
    }

    /// Classify the running platform.
    ///
    /// Native builds have no user agent, so the OS name stands in for one.
    pub fn detect(user_agent_override: Option<&str>) -> Self {
        let profile = match user_agent_override {
            Some(ua) => Self::from_user_agent(ua),
            None => Self::from_user_agent(platform_user_agent()),
        };
        tracing::debug!("Device profile: mobile={}", profile.is_mobile);
        profile
    }
}

fn platform_user_agent() -> &'static str {
    match std::env::consts::OS {
        "ios" => "iPhone",
        "android" => "Android",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_user_agents() {
        let agents = [
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)",
            "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X)",
            "Mozilla/5.0 (Linux; ANDROID 14; Pixel 8)",
            "ipod touch",
        ];
        for ua in agents {
            assert!(DeviceProfile::from_user_agent(ua).is_mobile, "{ua}");
        }
    }

    #[test]
    fn test_desktop_user_agents() {
        let agents = [
            "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
            "",
        ];
        for ua in agents {
            assert_eq!(DeviceProfile::from_user_agent(ua), DeviceProfile::DESKTOP);
        }
    }

    #[test]
    fn test_override_wins() {
        assert!(DeviceProfile::detect(Some("Android")).is_mobile);
        assert!(!DeviceProfile::detect(Some("Macintosh")).is_mobile);
    }
}
