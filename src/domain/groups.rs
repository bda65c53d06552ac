use crate::utils::error::{AtlasError, Result};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMember {
    pub code: String,
    pub name: String,
}

/// A named, fixed set of countries. Membership never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    id: String,
    title: String,
    members: Vec<GroupMember>,
    traits: Vec<String>,
}

impl Group {
    pub fn new(id: &str, title: &str, members: &[(&str, &str)]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut list = Vec::with_capacity(members.len());
        for (code, name) in members {
            let code = code.trim().to_ascii_uppercase();
            if !seen.insert(code.clone()) {
                return Err(AtlasError::Validation {
                    message: format!("group {} lists {} more than once", id, code),
                });
            }
            list.push(GroupMember {
                code,
                name: name.to_string(),
            });
        }
        if list.is_empty() {
            return Err(AtlasError::Validation {
                message: format!("group {} has no members", id),
            });
        }
        Ok(Self {
            id: id.to_string(),
            title: title.to_string(),
            members: list,
            traits: Vec::new(),
        })
    }

    pub fn with_traits(mut self, traits: &[&str]) -> Self {
        self.traits = traits.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn traits(&self) -> &[String] {
        &self.traits
    }
}

/// The regional groupings shown on comparison pages.
pub fn builtin_groups() -> Vec<Group> {
    let defs: [(&str, &str, &[(&str, &str)], &[&str]); 7] = [
        (
            "EU27",
            "European Union (EU-27)",
            &[
                ("AUT", "Austria"),
                ("BEL", "Belgium"),
                ("BGR", "Bulgaria"),
                ("HRV", "Croatia"),
                ("CYP", "Cyprus"),
                ("CZE", "Czech Republic"),
                ("DNK", "Denmark"),
                ("EST", "Estonia"),
                ("FIN", "Finland"),
                ("FRA", "France"),
                ("DEU", "Germany"),
                ("GRC", "Greece"),
                ("HUN", "Hungary"),
                ("IRL", "Ireland"),
                ("ITA", "Italy"),
                ("LVA", "Latvia"),
                ("LTU", "Lithuania"),
                ("LUX", "Luxembourg"),
                ("MLT", "Malta"),
                ("NLD", "Netherlands"),
                ("POL", "Poland"),
                ("PRT", "Portugal"),
                ("ROU", "Romania"),
                ("SVK", "Slovakia"),
                ("SVN", "Slovenia"),
                ("ESP", "Spain"),
                ("SWE", "Sweden"),
            ],
            &[],
        ),
        (
            "EFTA",
            "European Free Trade Association (EFTA)",
            &[
                ("ISL", "Iceland"),
                ("LIE", "Liechtenstein"),
                ("NOR", "Norway"),
                ("CHE", "Switzerland"),
            ],
            &[],
        ),
        (
            "UK",
            "United Kingdom",
            &[("GBR", "United Kingdom")],
            &[
                "Centralised labour regulation",
                "Distinct tax and currency regime",
                "Unified legal framework",
            ],
        ),
        (
            "WBALK",
            "Western Balkans",
            &[
                ("ALB", "Albania"),
                ("BIH", "Bosnia and Herzegovina"),
                ("MNE", "Montenegro"),
                ("MKD", "North Macedonia"),
                ("SRB", "Serbia"),
                ("XKX", "Kosovo"),
            ],
            &[],
        ),
        (
            "E_NEI",
            "Eastern Neighbourhood & Turkey",
            &[
                ("UKR", "Ukraine"),
                ("MDA", "Moldova"),
                ("BLR", "Belarus"),
                ("RUS", "Russia"),
                ("TUR", "Turkey"),
            ],
            &[],
        ),
        (
            "CAUC",
            "Caucasus",
            &[("ARM", "Armenia"), ("AZE", "Azerbaijan"), ("GEO", "Georgia")],
            &[],
        ),
        (
            "MICRO",
            "European Microstates",
            &[("AND", "Andorra"), ("MCO", "Monaco"), ("SMR", "San Marino")],
            &[],
        ),
    ];

    defs.iter()
        .filter_map(|(id, title, members, traits)| {
            Group::new(id, title, members)
                .map(|g| g.with_traits(traits))
                .ok()
        })
        .collect()
}

pub fn find_group<'a>(groups: &'a [Group], id: &str) -> Option<&'a Group> {
    groups.iter().find(|g| g.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_groups_are_complete() {
        let groups = builtin_groups();
        assert_eq!(groups.len(), 7);
        let total: usize = groups.iter().map(Group::len).sum();
        assert_eq!(total, 49);
        assert_eq!(find_group(&groups, "EU27").unwrap().len(), 27);
        assert_eq!(find_group(&groups, "UK").unwrap().traits().len(), 3);
        assert!(find_group(&groups, "NOPE").is_none());
    }

    #[test]
    fn test_duplicate_members_rejected() {
        let result = Group::new("X", "Dup", &[("DEU", "Germany"), ("deu", "Germany")]);
        assert!(matches!(result, Err(AtlasError::Validation { .. })));
    }

    #[test]
    fn test_empty_group_rejected() {
        assert!(Group::new("X", "Empty", &[]).is_err());
    }
}
