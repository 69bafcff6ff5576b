use std::collections::BTreeMap;

pub const UNKNOWN_REGION: &str = "알수없음";

/// Immutable region code → display name table handed to the services that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDirectory {
    names: BTreeMap<String, String>,
}

impl RegionDirectory {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(code, name)| (code.into(), name.into()))
                .collect(),
        }
    }

    /// Regional TBN stations.
    pub fn tbn() -> Self {
        Self::new([
            ("2", "부산"),
            ("3", "광주"),
            ("4", "대구"),
            ("5", "대전"),
            ("6", "경인"),
            ("7", "강원"),
            ("8", "전북"),
            ("9", "울산"),
            ("10", "경남"),
            ("11", "경북"),
            ("12", "제주"),
            ("13", "충북"),
            ("14", "충남"),
        ])
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.names.contains_key(code)
    }

    pub fn name_or_unknown(&self, code: &str) -> String {
        self.get(code).unwrap_or(UNKNOWN_REGION).to_string()
    }

    pub fn all(&self) -> BTreeMap<String, String> {
        self.names.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tbn_table_has_thirteen_regions() {
        let regions = RegionDirectory::tbn();
        assert_eq!(regions.all().len(), 13);
        assert_eq!(regions.get("2"), Some("부산"));
        assert_eq!(regions.get("14"), Some("충남"));
    }

    #[test]
    fn unknown_code_maps_to_placeholder() {
        let regions = RegionDirectory::tbn();
        assert_eq!(regions.name_or_unknown("1"), UNKNOWN_REGION);
        assert_eq!(regions.name_or_unknown(""), UNKNOWN_REGION);
    }
}
