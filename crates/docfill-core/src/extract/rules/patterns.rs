//! Regex patterns for field extraction.
//!
//! Labeled patterns are case-insensitive. Every pattern used by a [`Rule`]
//! puts the value in capture group 1.
//!
//! [`Rule`]: super::Rule

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Name
    pub static ref NAME_FULL_LABELED: Regex = Regex::new(
        r"(?im)Full\s+Name[:\s]+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)"
    ).unwrap();

    pub static ref NAME_LABELED: Regex = Regex::new(
        r"(?im)(?:Name|Name of|Applicant Name|Contact Name)[:\s]+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)"
    ).unwrap();

    pub static ref NAME_LINE_START: Regex = Regex::new(
        r"(?im)^([A-Z][a-z]+\s+[A-Z][a-z]+)"
    ).unwrap();

    pub static ref NAME_GREETING: Regex = Regex::new(
        r"(?im)(?:Dear|Hello|Hi)\s+([A-Z][a-z]+\s+[A-Z][a-z]+)"
    ).unwrap();

    // Email
    pub static ref EMAIL: Regex = Regex::new(
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b"
    ).unwrap();

    // Phone
    pub static ref PHONE_LABELED: Regex = Regex::new(
        r"(?i)(?:Phone|Mobile|Tel|Contact|Telephone)[:\s]+(\+?[\d\s\-()]{10,})"
    ).unwrap();

    pub static ref PHONE_US: Regex = Regex::new(
        r"(?i)\b(\+?1?[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4})\b"
    ).unwrap();

    pub static ref PHONE_PLAIN: Regex = Regex::new(
        r"\b(\d{3}[-.\s]?\d{3}[-.\s]?\d{4})\b"
    ).unwrap();

    pub static ref PHONE_INTERNATIONAL: Regex = Regex::new(
        r"\b(\+\d{1,3}[-.\s]?\d{1,4}[-.\s]?\d{1,4}[-.\s]?\d{1,9})\b"
    ).unwrap();

    // Address
    pub static ref ADDRESS_LABELED: Regex = Regex::new(
        r"(?i)(?:Mailing Address|Address|Location|Residence)[:\s]+([^\n]{10,150})"
    ).unwrap();

    pub static ref ADDRESS_STREET: Regex = Regex::new(
        r"(?i)(\d+\s+[A-Za-z0-9\s,]+(?:Street|St|Avenue|Ave|Road|Rd|Drive|Dr|Lane|Ln|Boulevard|Blvd|Court|Ct|Way|Place|Pl)[^\n]*)"
    ).unwrap();

    pub static ref ADDRESS_LABEL_PREFIX: Regex = Regex::new(
        r"(?i)^(?:Address|Location|Residence)[:\s]+"
    ).unwrap();

    // Date of birth
    pub static ref DOB_NUMERIC: Regex = Regex::new(
        r"(?i)(?:Date of Birth|DOB|Birth Date|Born|Birthday)[:\s]+(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})"
    ).unwrap();

    pub static ref DOB_MONTH_FIRST: Regex = Regex::new(
        r"(?i)(?:Date of Birth|DOB|Birth Date)[:\s]+([A-Za-z]+\s+\d{1,2},?\s+\d{4})"
    ).unwrap();

    pub static ref DOB_DAY_FIRST: Regex = Regex::new(
        r"(?i)(?:Date of Birth|DOB)[:\s]+(\d{1,2}\s+[A-Za-z]+\s+\d{4})"
    ).unwrap();

    pub static ref FOUR_DIGIT_YEAR: Regex = Regex::new(r"(\d{4})").unwrap();

    // Company. Longer labels come first in every alternation.
    pub static ref COMPANY_LABELED: Regex = Regex::new(
        r"(?i)(?:Company Name|Employer Name|Organization Name|Company|Employer|Organization)[:\s]+([A-Za-z0-9\s&.,\-]+)"
    ).unwrap();

    pub static ref COMPANY_PHRASE: Regex = Regex::new(
        r"(?i)(?:Works at|Employed at|Works for)[:\s]+([A-Za-z0-9\s&.,\-]+)"
    ).unwrap();

    // Job title
    pub static ref JOB_TITLE_LABELED: Regex = Regex::new(
        r"(?i)(?:Job Title|Position|Designation|Title|Role)[:\s]+([A-Za-z\s&/\-]+)"
    ).unwrap();

    pub static ref JOB_TITLE_PHRASE: Regex = Regex::new(
        r"(?i)(?:Works as|Position is|Title is)[:\s]+([A-Za-z\s&/\-]+)"
    ).unwrap();

    pub static ref LEADING_ARTICLE: Regex = Regex::new(r"(?i)^(?:the|a|an)\s+").unwrap();

    // Dates
    pub static ref DATE_LABELED_NUMERIC: Regex = Regex::new(
        r"(?i)(?:Date|Invoice Date|Application Date|Submission Date|Due Date)[:\s]+(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})"
    ).unwrap();

    pub static ref DATE_LABELED_MONTH: Regex = Regex::new(
        r"(?i)(?:Date|Invoice Date|Application Date)[:\s]+([A-Za-z]+\s+\d{1,2},?\s+\d{4})"
    ).unwrap();

    pub static ref DATE_UNLABELED: Regex = Regex::new(
        r"(\d{1,2}[/\-]\d{1,2}[/\-]\d{4})"
    ).unwrap();

    // Amounts
    pub static ref AMOUNT_LABELED: Regex = Regex::new(
        r"(?i)(?:Amount|Total|Price|Cost|Fee|Payment)[:\s]*\$?([\d,]+\.?\d*)"
    ).unwrap();

    pub static ref AMOUNT_DOLLAR_SIGN: Regex = Regex::new(
        r"\$([\d,]+\.?\d*)"
    ).unwrap();

    pub static ref AMOUNT_CURRENCY_WORD: Regex = Regex::new(
        r"(?i)([\d,]+\.?\d*)\s*(?:USD|dollars)"
    ).unwrap();

    // Identifiers
    pub static ref ID_LABELED: Regex = Regex::new(
        r"(?i)(?:ID Number|Passport Number|License Number|Social Security|SSN|ID)[:\s]+([A-Z0-9\-]+)"
    ).unwrap();

    pub static ref ID_LETTER_PREFIXED: Regex = Regex::new(
        r"(?i)\b([A-Z]{1,2}\d{6,})\b"
    ).unwrap();

    pub static ref ID_SSN: Regex = Regex::new(
        r"\b(\d{3}-\d{2}-\d{4})\b"
    ).unwrap();

    // Website
    pub static ref WEBSITE_LABELED: Regex = Regex::new(
        r"(?i)(?:Website|URL|Web|Site)[:\s]+(https?://[^\s]+|www\.[^\s]+|[a-z0-9-]+\.[a-z]{2,}(?:\.[a-z]{2,})?)"
    ).unwrap();

    // ZIP code
    pub static ref ZIP_US: Regex = Regex::new(
        r"\b(\d{5}(?:-\d{4})?)\b"
    ).unwrap();

    pub static ref ZIP_LABELED: Regex = Regex::new(
        r"(?i)(?:ZIP|Postal Code|Postcode)[:\s]+(\d{5,10})"
    ).unwrap();
}
