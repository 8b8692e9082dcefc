//! Fixed filter vocabularies

/// A selectable filter value and how it is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOption {
    pub label: &'static str,
    pub value: &'static str,
}

const fn opt(label: &'static str, value: &'static str) -> FilterOption {
    FilterOption { label, value }
}

pub const TYPE_OPTIONS: &[FilterOption] = &[opt("Public", "Public"), opt("Private", "Private")];

pub const RANKING_OPTIONS: &[FilterOption] = &[
    opt("Top 100", "top100"),
    opt("Top 500", "top500"),
    opt("Top 1000", "top1000"),
];

/// Group of related fields of study
#[derive(Debug, Clone, Copy)]
pub struct FieldSection {
    pub label: &'static str,
    pub courses: &'static [FilterOption],
}

pub const FIELD_SECTIONS: &[FieldSection] = &[
    FieldSection {
        label: "Computing",
        courses: &[
            opt("Computer Science", "computer_science"),
            opt("Software Development", "software_development"),
            opt("Data Science", "data_science"),
            opt("Cybersecurity", "cybersecurity"),
        ],
    },
    FieldSection {
        label: "Law",
        courses: &[
            opt("Law", "law"),
            opt("International Law", "international_law"),
            opt("Business Law", "business_law"),
        ],
    },
    FieldSection {
        label: "Medicine",
        courses: &[
            opt("Medicine", "medicine"),
            opt("Dentistry", "dentistry"),
            opt("Pharmacy", "pharmacy"),
        ],
    },
];

/// Display label for a field-of-study value, falling back to the raw value
pub fn field_label(value: &str) -> &str {
    FIELD_SECTIONS
        .iter()
        .flat_map(|s| s.courses.iter())
        .find(|c| c.value == value)
        .map(|c| c.label)
        .unwrap_or(value)
}

pub fn all_fields() -> impl Iterator<Item = &'static FilterOption> {
    FIELD_SECTIONS.iter().flat_map(|s| s.courses.iter())
}
