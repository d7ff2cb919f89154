//! crates/portfolio_core/src/i18n.rs
//!
//! Locale lookups for the chat: translation tables keyed by canonical English
//! text, and the fixed per-locale strings (greeting, fallback, labels).
//!
//! A missing translation always falls back to the English source string.

use crate::domain::Locale;
use std::collections::HashMap;

type Pairs = &'static [(&'static str, &'static str)];

/// Canonical English text -> localized text, per locale.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    questions: HashMap<Locale, HashMap<&'static str, &'static str>>,
    answers: HashMap<Locale, HashMap<&'static str, &'static str>>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tables shipped with the site (German and French).
    pub fn builtin() -> Self {
        Self::new()
            .with_questions(Locale::De, DE_QUESTIONS)
            .with_questions(Locale::Fr, FR_QUESTIONS)
            .with_answers(Locale::De, DE_ANSWERS)
            .with_answers(Locale::Fr, FR_ANSWERS)
    }

    pub fn with_questions(mut self, locale: Locale, pairs: Pairs) -> Self {
        self.questions.entry(locale).or_default().extend(pairs.iter().copied());
        self
    }

    pub fn with_answers(mut self, locale: Locale, pairs: Pairs) -> Self {
        self.answers.entry(locale).or_default().extend(pairs.iter().copied());
        self
    }

    pub fn translate_question<'a>(&'a self, question: &'a str, locale: Locale) -> &'a str {
        lookup(&self.questions, question, locale)
    }

    pub fn translate_answer<'a>(&'a self, answer: &'a str, locale: Locale) -> &'a str {
        lookup(&self.answers, answer, locale)
    }
}

fn lookup<'a>(
    table: &'a HashMap<Locale, HashMap<&'static str, &'static str>>,
    source: &'a str,
    locale: Locale,
) -> &'a str {
    if locale == Locale::En {
        return source;
    }
    table
        .get(&locale)
        .and_then(|strings| strings.get(source))
        .copied()
        .filter(|translated| !translated.is_empty())
        .unwrap_or(source)
}

//=========================================================================================
// Fixed Strings
//=========================================================================================

pub fn greeting(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Hello! I'm here to help you learn more about Nguyen. Feel free to ask me any questions about his background, experience, or availability.",
        Locale::De => "Hallo! Ich bin hier, um Ihnen mehr über Nguyen zu erzählen. Stellen Sie mir gerne Fragen zu seinem Hintergrund, seiner Erfahrung oder Verfügbarkeit.",
        Locale::Fr => "Bonjour ! Je suis là pour vous aider à en savoir plus sur Nguyen. N'hésitez pas à me poser des questions sur son parcours, son expérience ou sa disponibilité.",
    }
}

/// Reply used when nothing in the catalog matches. The contact action is
/// rendered separately, so no address is embedded here.
pub fn unknown_response(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "I don't have that information available in this chat. For more details, please contact Nguyen directly:",
        Locale::De => "Diese Information ist in diesem Chat leider nicht verfügbar. Für weitere Details kontaktieren Sie Nguyen bitte direkt:",
        Locale::Fr => "Je n'ai pas cette information disponible dans ce chat. Pour plus de détails, veuillez contacter Nguyen directement :",
    }
}

pub fn contact_button_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Contact Me",
        Locale::De => "Kontaktieren",
        Locale::Fr => "Me contacter",
    }
}

pub fn suggested_questions_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Suggested questions:",
        Locale::De => "Vorgeschlagene Fragen:",
        Locale::Fr => "Questions suggérées :",
    }
}

//=========================================================================================
// Built-in Tables
//=========================================================================================

const DE_QUESTIONS: Pairs = &[
    ("Where are you currently located?", "Wo befinden Sie sich derzeit?"),
    ("Are you legally allowed to work in Germany?", "Sind Sie berechtigt, in Deutschland zu arbeiten?"),
    ("Do you require visa sponsorship?", "Benötigen Sie eine Visumsponsoring?"),
    ("When is your earliest possible start date?", "Was ist Ihr frühestmöglicher Starttermin?"),
    ("Are you open to remote, hybrid, or onsite work?", "Sind Sie offen für Remote-, Hybrid- oder Vor-Ort-Arbeit?"),
    ("How many years of experience do you have as a Frontend Developer?", "Wie viele Jahre Erfahrung haben Sie als Frontend-Entwickler?"),
    ("What is your English proficiency level?", "Wie gut sind Ihre Englischkenntnisse?"),
    ("Do you speak German? If yes, at what level?", "Sprechen Sie Deutsch? Wenn ja, auf welchem Niveau?"),
    ("What type of role are you looking for (Junior / Mid / Senior)?", "Welche Art von Position suchen Sie (Junior / Mid / Senior)?"),
    ("What are you looking for in your next team?", "Was erwarten Sie von Ihrem nächsten Team?"),
    ("What is your expected salary range (gross per year in EUR)?", "Was ist Ihre Gehaltsvorstellung (brutto pro Jahr in EUR)?"),
];

const FR_QUESTIONS: Pairs = &[
    ("Where are you currently located?", "Où êtes-vous actuellement situé ?"),
    ("Are you legally allowed to work in Germany?", "Êtes-vous légalement autorisé à travailler en Allemagne ?"),
    ("Do you require visa sponsorship?", "Avez-vous besoin d'un parrainage de visa ?"),
    ("When is your earliest possible start date?", "Quelle est votre date de début la plus proche possible ?"),
    ("Are you open to remote, hybrid, or onsite work?", "Êtes-vous ouvert au travail à distance, hybride ou sur site ?"),
    ("How many years of experience do you have as a Frontend Developer?", "Combien d'années d'expérience avez-vous en tant que développeur Frontend ?"),
    ("What is your English proficiency level?", "Quel est votre niveau d'anglais ?"),
    ("Do you speak German? If yes, at what level?", "Parlez-vous allemand ? Si oui, à quel niveau ?"),
    ("What type of role are you looking for (Junior / Mid / Senior)?", "Quel type de poste recherchez-vous (Junior / Mid / Senior) ?"),
    ("What are you looking for in your next team?", "Que recherchez-vous dans votre prochaine équipe ?"),
    ("What is your expected salary range (gross per year in EUR)?", "Quelle est votre fourchette salariale attendue (brut par an en EUR) ?"),
];

const DE_ANSWERS: Pairs = &[
    ("I am currently based in Berlin, Germany.", "Ich lebe derzeit in Berlin, Deutschland."),
    ("Yes, I am legally allowed to work in Germany. I hold an Opportunity Card (Chancenkarte) visa.", "Ja, ich bin berechtigt, in Deutschland zu arbeiten. Ich besitze ein Chancenkarte-Visum."),
    ("No, I do not require visa sponsorship.", "Nein, ich benötige kein Visumsponsoring."),
    ("My earliest possible start date is March 2, 2026.", "Mein frühestmöglicher Starttermin ist der 2. März 2026."),
    ("Yes, I am open to remote, hybrid, and onsite work.", "Ja, ich bin offen für Remote-, Hybrid- und Vor-Ort-Arbeit."),
    ("I have 6 years of experience as a Frontend Developer, with strong expertise in React, TypeScript, and JavaScript.", "Ich habe 6 Jahre Erfahrung als Frontend-Entwickler mit fundierter Expertise in React, TypeScript und JavaScript."),
    ("My English proficiency level is B2.", "Mein Englischniveau ist B2."),
    ("Yes, I speak German at an A2 level. I am actively working on improving it and study and practice German every day.", "Ja, ich spreche Deutsch auf A2-Niveau. Ich arbeite aktiv daran, mich zu verbessern und lerne und übe jeden Tag Deutsch."),
    ("I am primarily focusing on Mid to Senior Frontend Developer roles. However, I am also open to Junior-level positions, as I have recently relocated to Germany.", "Ich konzentriere mich hauptsächlich auf Mid- bis Senior-Frontend-Entwickler-Positionen. Ich bin jedoch auch offen für Junior-Positionen, da ich kürzlich nach Deutschland umgezogen bin."),
    ("I am looking for a dynamic and collaborative team where people are motivated and supportive. I enjoy working in a goal-oriented environment where the product is continuously improving and reaching more users. Being able to see the real impact of my work is very motivating for me.", "Ich suche ein dynamisches und kollaboratives Team, in dem die Menschen motiviert und unterstützend sind. Ich arbeite gerne in einer zielorientierten Umgebung, in der das Produkt kontinuierlich verbessert wird und mehr Nutzer erreicht. Die realen Auswirkungen meiner Arbeit zu sehen, motiviert mich sehr."),
    ("My salary expectations depend on the scope of the role and level of responsibility. I am generally looking for a range between €50,000 and €70,000 gross per year. That said, I am open to discussion if the role, responsibilities, and growth opportunities are a good overall fit.", "Meine Gehaltsvorstellungen hängen vom Umfang der Rolle und dem Verantwortungsniveau ab. Ich suche generell eine Spanne zwischen 50.000 € und 70.000 € brutto pro Jahr. Dennoch bin ich offen für Gespräche, wenn die Rolle, Verantwortlichkeiten und Wachstumsmöglichkeiten insgesamt gut passen."),
];

const FR_ANSWERS: Pairs = &[
    ("I am currently based in Berlin, Germany.", "Je suis actuellement basé à Berlin, en Allemagne."),
    ("Yes, I am legally allowed to work in Germany. I hold an Opportunity Card (Chancenkarte) visa.", "Oui, je suis légalement autorisé à travailler en Allemagne. Je possède un visa Chancenkarte (Carte d'opportunité)."),
    ("No, I do not require visa sponsorship.", "Non, je n'ai pas besoin de parrainage de visa."),
    ("My earliest possible start date is March 2, 2026.", "Ma date de début la plus proche possible est le 2 mars 2026."),
    ("Yes, I am open to remote, hybrid, and onsite work.", "Oui, je suis ouvert au travail à distance, hybride et sur site."),
    ("I have 6 years of experience as a Frontend Developer, with strong expertise in React, TypeScript, and JavaScript.", "J'ai 6 ans d'expérience en tant que développeur Frontend, avec une forte expertise en React, TypeScript et JavaScript."),
    ("My English proficiency level is B2.", "Mon niveau d'anglais est B2."),
    ("Yes, I speak German at an A2 level. I am actively working on improving it and study and practice German every day.", "Oui, je parle allemand au niveau A2. Je travaille activement à m'améliorer et j'étudie et pratique l'allemand tous les jours."),
    ("I am primarily focusing on Mid to Senior Frontend Developer roles. However, I am also open to Junior-level positions, as I have recently relocated to Germany.", "Je me concentre principalement sur des postes de développeur Frontend Mid à Senior. Cependant, je suis également ouvert aux postes Junior, car j'ai récemment déménagé en Allemagne."),
    ("I am looking for a dynamic and collaborative team where people are motivated and supportive. I enjoy working in a goal-oriented environment where the product is continuously improving and reaching more users. Being able to see the real impact of my work is very motivating for me.", "Je recherche une équipe dynamique et collaborative où les gens sont motivés et solidaires. J'aime travailler dans un environnement orienté objectifs où le produit s'améliore continuellement et atteint plus d'utilisateurs. Pouvoir voir l'impact réel de mon travail est très motivant pour moi."),
    ("My salary expectations depend on the scope of the role and level of responsibility. I am generally looking for a range between €50,000 and €70,000 gross per year. That said, I am open to discussion if the role, responsibilities, and growth opportunities are a good overall fit.", "Mes attentes salariales dépendent de l'étendue du rôle et du niveau de responsabilité. Je recherche généralement une fourchette entre 50 000 € et 70 000 € brut par an. Cela dit, je suis ouvert à la discussion si le rôle, les responsabilités et les opportunités de croissance correspondent bien dans l'ensemble."),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QA_CATALOG;

    #[test]
    fn english_is_passthrough() {
        let table = TranslationTable::builtin();
        let q = "Where are you currently located?";
        assert_eq!(table.translate_question(q, Locale::En), q);
    }

    #[test]
    fn every_catalog_entry_is_translated() {
        let table = TranslationTable::builtin();
        for locale in [Locale::De, Locale::Fr] {
            for entry in QA_CATALOG {
                assert_ne!(table.translate_question(entry.question, locale), entry.question);
                assert_ne!(table.translate_answer(entry.answer, locale), entry.answer);
            }
        }
    }

    #[test]
    fn missing_translation_falls_back_to_english() {
        let table = TranslationTable::new().with_answers(Locale::De, &[("a", "b")]);
        assert_eq!(table.translate_answer("unregistered", Locale::De), "unregistered");
        assert_eq!(table.translate_answer("anything", Locale::Fr), "anything");
        assert_eq!(table.translate_answer("a", Locale::De), "b");
    }
}
