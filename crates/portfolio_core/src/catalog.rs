//! crates/portfolio_core/src/catalog.rs
//!
//! The compiled-in FAQ catalog. All texts are canonical English; translations
//! are looked up at runtime in `i18n`.

use crate::domain::{Category, QaEntry};

/// Catalog order is the tie-break order for matching and suggestions.
pub const QA_CATALOG: &[QaEntry] = &[
    QaEntry {
        id: "location",
        keywords: &["where", "located", "location", "based", "live", "city", "country", "berlin", "germany"],
        question: "Where are you currently located?",
        answer: "I am currently based in Berlin, Germany.",
        category: Category::Location,
    },
    QaEntry {
        id: "work-permit",
        keywords: &["legal", "allowed", "work", "permit", "authorization", "right to work"],
        question: "Are you legally allowed to work in Germany?",
        answer: "Yes, I am legally allowed to work in Germany. I hold an Opportunity Card (Chancenkarte) visa.",
        category: Category::Visa,
    },
    QaEntry {
        id: "visa-sponsorship",
        keywords: &["visa", "sponsorship", "sponsor", "require"],
        question: "Do you require visa sponsorship?",
        answer: "No, I do not require visa sponsorship.",
        category: Category::Visa,
    },
    QaEntry {
        id: "start-date",
        keywords: &["start", "date", "begin", "available", "earliest", "when", "join"],
        question: "When is your earliest possible start date?",
        answer: "My earliest possible start date is March 2, 2026.",
        category: Category::Availability,
    },
    QaEntry {
        id: "work-mode",
        keywords: &["remote", "hybrid", "onsite", "office", "home", "work from", "flexible", "arrangement"],
        question: "Are you open to remote, hybrid, or onsite work?",
        answer: "Yes, I am open to remote, hybrid, and onsite work.",
        category: Category::Availability,
    },
    QaEntry {
        id: "experience-years",
        keywords: &["experience", "years", "how long", "frontend", "developer", "expertise"],
        question: "How many years of experience do you have as a Frontend Developer?",
        answer: "I have 6 years of experience as a Frontend Developer, with strong expertise in React, TypeScript, and JavaScript.",
        category: Category::Experience,
    },
    QaEntry {
        id: "english-level",
        keywords: &["english", "proficiency", "level", "speak english", "language english"],
        question: "What is your English proficiency level?",
        answer: "My English proficiency level is B2.",
        category: Category::Language,
    },
    QaEntry {
        id: "german-level",
        keywords: &["german", "deutsch", "speak german", "language german"],
        question: "Do you speak German? If yes, at what level?",
        answer: "Yes, I speak German at an A2 level. I am actively working on improving it and study and practice German every day.",
        category: Category::Language,
    },
    QaEntry {
        id: "role-level",
        keywords: &["role", "level", "junior", "mid", "senior", "position", "looking for", "type of role"],
        question: "What type of role are you looking for (Junior / Mid / Senior)?",
        answer: "I am primarily focusing on Mid to Senior Frontend Developer roles. However, I am also open to Junior-level positions, as I have recently relocated to Germany.",
        category: Category::Role,
    },
    QaEntry {
        id: "team-expectations",
        keywords: &["team", "culture", "environment", "colleagues", "looking for in", "expect", "ideal team"],
        question: "What are you looking for in your next team?",
        answer: "I am looking for a dynamic and collaborative team where people are motivated and supportive. I enjoy working in a goal-oriented environment where the product is continuously improving and reaching more users. Being able to see the real impact of my work is very motivating for me.",
        category: Category::Team,
    },
    QaEntry {
        id: "salary",
        keywords: &["salary", "compensation", "money", "pay", "expected", "range", "gross", "annual", "year", "eur", "euro"],
        question: "What is your expected salary range (gross per year in EUR)?",
        answer: "My salary expectations depend on the scope of the role and level of responsibility. I am generally looking for a range between €50,000 and €70,000 gross per year. That said, I am open to discussion if the role, responsibilities, and growth opportunities are a good overall fit.",
        category: Category::Salary,
    },
];
