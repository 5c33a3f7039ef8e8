use once_cell::sync::Lazy;
use regex::Regex;
use web_sys::Window;

static MOBILE_USER_AGENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
        .expect("mobile user agent pattern is valid")
});

/// Coarse device class used to pick a deep-link strategy.
///
/// Classification is a best-effort match on the browser's self-reported
/// user agent. Misclassification is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mobile,
    Desktop,
}

impl Platform {
    pub fn classify(user_agent: &str) -> Self {
        if MOBILE_USER_AGENT.is_match(user_agent) {
            Platform::Mobile
        } else {
            Platform::Desktop
        }
    }

    pub fn detect(window: &Window) -> Self {
        match window.navigator().user_agent() {
            Ok(user_agent) => Self::classify(&user_agent),
            Err(e) => {
                log::warn!("Could not read user agent, assuming desktop: {:?}", e);
                Platform::Desktop
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phones_and_tablets_are_mobile() {
        let agents = [
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Chrome/124.0 Mobile Safari/537.36",
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148",
            "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X) AppleWebKit/605.1.15",
            "Opera/9.80 (J2ME/MIDP; Opera Mini/9.80; U; en) Presto/2.5.25",
        ];
        for agent in agents {
            assert_eq!(Platform::classify(agent), Platform::Mobile, "{}", agent);
        }
    }

    #[test]
    fn test_desktop_browsers_are_desktop() {
        let agents = [
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/124.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 Version/17.4 Safari/605.1.15",
            "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
            "",
        ];
        for agent in agents {
            assert_eq!(Platform::classify(agent), Platform::Desktop, "{}", agent);
        }
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(Platform::classify("some-browser ANDROID build"), Platform::Mobile);
        assert_eq!(Platform::classify("iphone"), Platform::Mobile);
    }
}
