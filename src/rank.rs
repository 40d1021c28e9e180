use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ir::Contact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "C-Suite")]
    CSuite,
    #[serde(rename = "VP")]
    Vp,
    Director,
    Manager,
    #[serde(rename = "Individual Contributor")]
    IndividualContributor,
}

impl Rank {
    /// 0 is most senior.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::CSuite => "C-Suite",
            Rank::Vp => "VP",
            Rank::Director => "Director",
            Rank::Manager => "Manager",
            Rank::IndividualContributor => "Individual Contributor",
        }
    }
}

static C_SUITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)chief\s+[a-z\s]+\s+officer\b|\bc[a-z]{1,3}o\b").unwrap()
});
static VP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bsvp\b|senior\s+vice\s+president|exec(?:utive)?\s+vp|\bevp\b|\bvp\b|vice\s+president",
    )
    .unwrap()
});
static DIRECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)head\s+of|\bchair\b|chairperson|managing\s+director|sr\.?\s*director|senior\s+director|associate\s+director|assistant\s+director|director\b",
    )
    .unwrap()
});
static MANAGER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)general\s+manager|sr\.?\s*manager|senior\s+manager|associate\s+manager|assistant\s+manager|manager\b|\blead\b|\bprincipal\b",
    )
    .unwrap()
});

fn rules() -> [(&'static Regex, Rank); 4] {
    [
        (&*C_SUITE_RE, Rank::CSuite),
        (&*VP_RE, Rank::Vp),
        (&*DIRECTOR_RE, Rank::Director),
        (&*MANAGER_RE, Rank::Manager),
    ]
}

/// First matching rule wins; unmatched titles are individual contributors.
pub fn infer_rank(title: &str) -> Rank {
    let title = title.trim();
    if title.is_empty() {
        return Rank::IndividualContributor;
    }
    rules()
        .into_iter()
        .find(|(re, _)| re.is_match(title))
        .map(|(_, rank)| rank)
        .unwrap_or(Rank::IndividualContributor)
}

/// Deterministic ordering of nodes: seniority, then last name, first name, id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeniorityKey {
    pub rank: Rank,
    pub last_name: String,
    pub first_name: String,
    pub id: String,
}

impl SeniorityKey {
    /// Unknown contacts sort as individual contributors with blank names.
    pub fn new(contact_id: &str, contact: Option<&Contact>) -> Self {
        match contact {
            Some(contact) => Self {
                rank: infer_rank(&contact.title),
                last_name: contact.last_name.trim().to_lowercase(),
                first_name: contact.first_name.trim().to_lowercase(),
                id: contact_id.to_string(),
            },
            None => Self {
                rank: Rank::IndividualContributor,
                last_name: String::new(),
                first_name: String::new(),
                id: contact_id.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_suite_titles() {
        assert_eq!(infer_rank("CEO"), Rank::CSuite);
        assert_eq!(infer_rank("Chief Commercial Officer"), Rank::CSuite);
        assert_eq!(infer_rank("Global CHRO"), Rank::CSuite);
        assert_eq!(infer_rank("cfo & treasurer"), Rank::CSuite);
    }

    #[test]
    fn vp_titles() {
        assert_eq!(infer_rank("VP Marketing"), Rank::Vp);
        assert_eq!(infer_rank("Senior Vice President, Oncology"), Rank::Vp);
        assert_eq!(infer_rank("EVP Operations"), Rank::Vp);
        assert_eq!(infer_rank("Executive VP"), Rank::Vp);
    }

    #[test]
    fn director_beats_manager() {
        assert_eq!(infer_rank("Managing Director"), Rank::Director);
        assert_eq!(infer_rank("Head of Market Access"), Rank::Director);
        assert_eq!(infer_rank("Sr. Director, Brand"), Rank::Director);
        assert_eq!(infer_rank("Board Chair"), Rank::Director);
    }

    #[test]
    fn manager_titles() {
        assert_eq!(infer_rank("Marketing Manager"), Rank::Manager);
        assert_eq!(infer_rank("Team Lead"), Rank::Manager);
        assert_eq!(infer_rank("Principal Scientist"), Rank::Manager);
        assert_eq!(infer_rank("General Manager"), Rank::Manager);
    }

    #[test]
    fn everything_else_is_individual_contributor() {
        assert_eq!(infer_rank(""), Rank::IndividualContributor);
        assert_eq!(infer_rank("   "), Rank::IndividualContributor);
        assert_eq!(infer_rank("Analyst"), Rank::IndividualContributor);
        assert_eq!(infer_rank("Leadership Coach"), Rank::IndividualContributor);
    }

    #[test]
    fn indices_follow_seniority() {
        assert_eq!(Rank::CSuite.index(), 0);
        assert_eq!(Rank::IndividualContributor.index(), 4);
        assert!(Rank::CSuite < Rank::IndividualContributor);
        assert_eq!(Rank::Vp.label(), "VP");
    }

    #[test]
    fn seniority_key_orders_rank_then_name() {
        let ceo = Contact::new("1", "Zed", "Young", "CEO");
        let vp_a = Contact::new("2", "Amy", "Brown", "VP Sales");
        let vp_b = Contact::new("3", "Al", "brown", "VP Ops");
        let mut keys = vec![
            SeniorityKey::new("2", Some(&vp_a)),
            SeniorityKey::new("9", None),
            SeniorityKey::new("3", Some(&vp_b)),
            SeniorityKey::new("1", Some(&ceo)),
        ];
        keys.sort();
        let ids: Vec<&str> = keys.iter().map(|key| key.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "2", "9"]);
    }
}
