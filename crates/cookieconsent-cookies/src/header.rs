//! `document.cookie` header parsing and the Consent Evaluator.

/// One `name=value` entry of a cookie header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub name: String,
    pub value: String,
}

/// Split a `a=1; b=2` header into trimmed pairs. Entries without `=` are kept
/// with an empty value; blank entries are dropped.
pub fn parse_cookie_header(header: &str) -> Vec<CookiePair> {
    header
        .split(';')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            let (name, value) = entry.split_once('=').unwrap_or((entry, ""));
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(CookiePair {
                name: name.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

/// Value of the first cookie called `name`, if any.
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    parse_cookie_header(header)
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| c.value)
}

/// Whether the banner should be offered: true unless a `name` entry exists
/// and its value contains `true`.
pub fn should_show_popup(header: &str, name: &str) -> bool {
    match find_cookie(header, name) {
        Some(value) => !value.contains("true"),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "hidePopup";

    #[test]
    fn test_parse_header() {
        let pairs = parse_cookie_header("a=1; b = 2 ;;c; =orphan; token=x=y");
        let names: Vec<&str> = pairs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "token"]);
        assert_eq!(pairs[1].value, "2");
        assert_eq!(pairs[2].value, "");
        assert_eq!(pairs[3].value, "x=y");
    }

    #[test]
    fn test_hidden_when_recorded() {
        for header in [
            "hidePopup=true",
            "a=1; hidePopup=true",
            "a=1;hidePopup=true;b=2",
            "  hidePopup = true  ",
            "_ga=GA1.2.3; hidePopup=true-rejected",
        ] {
            assert!(!should_show_popup(header, NAME), "header: {header}");
        }
    }

    #[test]
    fn test_shown_without_record() {
        for header in [
            "",
            "a=1; b=2",
            "hidePopup=false",
            "hidePopup=",
            "hidePopupLegacy=true",
            "xhidePopup=true",
        ] {
            assert!(should_show_popup(header, NAME), "header: {header}");
        }
    }

    #[test]
    fn test_find_cookie_first_wins() {
        assert_eq!(
            find_cookie("hidePopup=false; hidePopup=true", NAME).as_deref(),
            Some("false")
        );
        assert_eq!(find_cookie("a=1", NAME), None);
    }
}
