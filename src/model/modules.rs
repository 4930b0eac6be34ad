/// Static catalog of curriculum modules.
///
/// Modules only scope which transactions and progress records are
/// requested; they are never fetched. Child modules (piscines run inside the
/// main module) carry their parent's id.
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

/// Module selected when neither config nor stored preference names one.
pub const DEFAULT_MODULE_ID: u32 = 75;

/// A named curriculum scoping unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub id: u32,
    pub name: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub parent_id: Option<u32>,
}

const CATALOG: &[(u32, &str, (i32, u32, u32), (i32, u32, u32), Option<u32>)] = &[
    (48, "Piscine Go", (2024, 1, 22), (2024, 2, 17), None),
    (75, "Module", (2024, 4, 8), (2026, 4, 8), None),
    (83, "Piscine JS", (2024, 8, 26), (2024, 9, 21), Some(75)),
    (84, "Piscine Rust", (2025, 4, 1), (2025, 5, 2), Some(75)),
    (88, "piscine-ux", (2024, 9, 30), (2024, 10, 25), Some(75)),
    (180, "piscine-ui", (2024, 11, 4), (2024, 11, 25), Some(75)),
];

/// All known modules, parents listed before their children.
pub fn module_catalog() -> &'static [Module] {
    static MODULES: OnceLock<Vec<Module>> = OnceLock::new();
    MODULES.get_or_init(|| {
        CATALOG
            .iter()
            .filter_map(|&(id, name, start, end, parent_id)| {
                Some(Module {
                    id,
                    name,
                    start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2)?,
                    end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2)?,
                    parent_id,
                })
            })
            .collect()
    })
}

/// Look up a module by id.
pub fn find_module(id: u32) -> Option<&'static Module> {
    module_catalog().iter().find(|m| m.id == id)
}

/// Extract the module number embedded in a path as `#<digits>`.
pub fn module_number(path: &str) -> Option<u32> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"#(\d+)").ok()).as_ref()?;
    re.captures(path)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_default_module() {
        let module = find_module(DEFAULT_MODULE_ID).unwrap();
        assert_eq!(module.name, "Module");
        assert!(module.parent_id.is_none());
    }

    #[test]
    fn children_reference_parent() {
        let rust = find_module(84).unwrap();
        assert_eq!(rust.parent_id, Some(75));
        assert!(rust.start_date < rust.end_date);
        assert_eq!(module_catalog().len(), 6);
    }

    #[test]
    fn module_number_from_path() {
        assert_eq!(module_number("/kisumu/module#75/graphql"), Some(75));
        assert_eq!(module_number("/kisumu/piscine-go"), None);
        assert_eq!(find_module(999), None);
    }
}
