//! Employment fields: company and job title.

use lazy_static::lazy_static;

use super::patterns::{
    COMPANY_LABELED, COMPANY_PHRASE, JOB_TITLE_LABELED, JOB_TITLE_PHRASE, LEADING_ARTICLE,
};
use super::{first_accepted, truncate_chars, Rule};

const MAX_COMPANY_CHARS: usize = 100;

lazy_static! {
    pub static ref COMPANY_RULES: Vec<Rule> = vec![
        Rule::first("company_label", &COMPANY_LABELED, accept_company),
        Rule::first("company_phrase", &COMPANY_PHRASE, accept_company),
    ];

    pub static ref JOB_TITLE_RULES: Vec<Rule> = vec![
        Rule::first("job_title_label", &JOB_TITLE_LABELED, accept_job_title),
        Rule::first("job_title_phrase", &JOB_TITLE_PHRASE, accept_job_title),
    ];
}

/// Extract an employer or organization name.
pub fn extract_company(text: &str) -> Option<String> {
    first_accepted(text, &COMPANY_RULES)
}

/// Extract a job title. Only explicitly labeled titles are accepted.
pub fn extract_job_title(text: &str) -> Option<String> {
    first_accepted(text, &JOB_TITLE_RULES)
}

fn accept_company(candidate: &str) -> Option<String> {
    let first_line = candidate.trim().split('\n').next().unwrap_or("").trim();
    let company = truncate_chars(first_line, MAX_COMPANY_CHARS);
    (company.chars().count() > 2).then_some(company)
}

fn accept_job_title(candidate: &str) -> Option<String> {
    let title = candidate
        .trim()
        .split(['\n', '\r', ',', ';'])
        .next()
        .unwrap_or("")
        .trim();
    let title = LEADING_ARTICLE.replace(title, "");

    let len = title.chars().count();
    (len > 2 && len < 100).then(|| title.into_owned())
}
