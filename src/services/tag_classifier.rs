//! Classifies free-text directory tags into job and company fields.
//!
//! Each tag is checked against an ordered rule list; the first rule whose
//! predicate matches decides the field. A field either keeps the first
//! value it sees or is overwritten by later matches.

const JOB_TYPE_MARKERS: &[&str] = &["Full-time", "Part-time", "Internship", "Contract"];
const EXPERIENCE_MARKERS: &[&str] = &["years", "year", "+", "yr"];
const COMPANY_LOCATIONS: &[&str] = &["New York", "San Francisco", "Remote", "London", "Boston"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    FirstWins,
    LastWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobField {
    Remote,
    JobType,
    Experience,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompanyField {
    Size,
    Location,
    Industry,
}

struct Rule<F> {
    matches: fn(&str) -> bool,
    field: F,
    policy: Policy,
}

fn contains_any(tag: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| tag.contains(n))
}

fn is_remote(tag: &str) -> bool {
    tag.contains("Remote")
}

fn is_job_type(tag: &str) -> bool {
    contains_any(tag, JOB_TYPE_MARKERS)
}

fn is_experience(tag: &str) -> bool {
    contains_any(tag, EXPERIENCE_MARKERS)
}

fn is_company_size(tag: &str) -> bool {
    tag.contains("people")
}

fn is_company_location(tag: &str) -> bool {
    contains_any(tag, COMPANY_LOCATIONS)
}

fn any_tag(_: &str) -> bool {
    true
}

const JOB_RULES: &[Rule<JobField>] = &[
    Rule {
        matches: is_remote,
        field: JobField::Remote,
        policy: Policy::LastWins,
    },
    Rule {
        matches: is_job_type,
        field: JobField::JobType,
        policy: Policy::LastWins,
    },
    Rule {
        matches: is_experience,
        field: JobField::Experience,
        policy: Policy::LastWins,
    },
    Rule {
        matches: any_tag,
        field: JobField::Location,
        policy: Policy::FirstWins,
    },
];

// No first-wins guard here: the last industry-like tag is kept.
const COMPANY_RULES: &[Rule<CompanyField>] = &[
    Rule {
        matches: is_company_size,
        field: CompanyField::Size,
        policy: Policy::LastWins,
    },
    Rule {
        matches: is_company_location,
        field: CompanyField::Location,
        policy: Policy::LastWins,
    },
    Rule {
        matches: any_tag,
        field: CompanyField::Industry,
        policy: Policy::LastWins,
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobTags {
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub is_remote: bool,
    pub experience_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyTags {
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
}

fn assign(slot: &mut Option<String>, tag: &str, policy: Policy) {
    if policy == Policy::LastWins || slot.is_none() {
        *slot = Some(tag.trim().to_string());
    }
}

fn first_match<F: Copy>(rules: &[Rule<F>], tag: &str) -> Option<(F, Policy)> {
    rules
        .iter()
        .find(|rule| (rule.matches)(tag))
        .map(|rule| (rule.field, rule.policy))
}

pub fn classify_job_tags(groups: &[Vec<String>]) -> JobTags {
    let mut out = JobTags::default();
    for tag in groups.iter().flatten() {
        match first_match(JOB_RULES, tag) {
            Some((JobField::Remote, _)) => out.is_remote = true,
            Some((JobField::JobType, policy)) => assign(&mut out.job_type, tag, policy),
            Some((JobField::Experience, policy)) => {
                assign(&mut out.experience_range, tag, policy)
            }
            Some((JobField::Location, policy)) => assign(&mut out.location, tag, policy),
            None => {}
        }
    }
    out
}

pub fn classify_company_tags(tags: &[String]) -> CompanyTags {
    let mut out = CompanyTags::default();
    for tag in tags {
        match first_match(COMPANY_RULES, tag) {
            Some((CompanyField::Size, policy)) => assign(&mut out.size, tag, policy),
            Some((CompanyField::Location, policy)) => assign(&mut out.location, tag, policy),
            Some((CompanyField::Industry, policy)) => assign(&mut out.industry, tag, policy),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn classifies_a_typical_tag_list() {
        let tags = classify_job_tags(&[group(&["Remote", "Full-time", "3+ years", "New York"])]);
        assert_eq!(
            tags,
            JobTags {
                location: Some("New York".into()),
                job_type: Some("Full-time".into()),
                is_remote: true,
                experience_range: Some("3+ years".into()),
            }
        );
    }

    #[test]
    fn remote_tag_never_becomes_location() {
        let tags = classify_job_tags(&[group(&["Remote (US)"]), group(&["Berlin"])]);
        assert!(tags.is_remote);
        assert_eq!(tags.location.as_deref(), Some("Berlin"));
    }

    #[test]
    fn first_unclassified_tag_is_the_location() {
        let tags = classify_job_tags(&[group(&[" Austin, TX ", "Engineering", "Backend"])]);
        assert_eq!(tags.location.as_deref(), Some("Austin, TX"));
    }

    #[test]
    fn job_type_keeps_the_last_match() {
        let tags = classify_job_tags(&[group(&["Contract", "Full-time"])]);
        assert_eq!(tags.job_type.as_deref(), Some("Full-time"));
    }

    #[test]
    fn job_type_outranks_experience() {
        // "Internship" wins even though "1 year" would also match experience.
        let tags = classify_job_tags(&[group(&["Internship 1 year"])]);
        assert_eq!(tags.job_type.as_deref(), Some("Internship 1 year"));
        assert_eq!(tags.experience_range, None);
    }

    #[test]
    fn company_tags_split_into_fields() {
        let tags = classify_company_tags(&group(&["Fintech", "11-50 people", "San Francisco"]));
        assert_eq!(tags.industry.as_deref(), Some("Fintech"));
        assert_eq!(tags.size.as_deref(), Some("11-50 people"));
        assert_eq!(tags.location.as_deref(), Some("San Francisco"));
    }

    #[test]
    fn company_industry_keeps_the_last_tag() {
        // Unlike job locations, company industry has no first-wins guard.
        let tags = classify_company_tags(&group(&["Fintech", "B2B", "Payments"]));
        assert_eq!(tags.industry.as_deref(), Some("Payments"));
    }

    #[test]
    fn empty_input_classifies_to_nothing() {
        assert_eq!(classify_job_tags(&[]), JobTags::default());
        assert_eq!(classify_company_tags(&[]), CompanyTags::default());
    }
}
