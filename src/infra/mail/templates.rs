//! Built-in email templates with `{{key}}` placeholders.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::config::{TEMPLATE_CONTACT_CONFIRMATION, TEMPLATE_CONTACT_NOTIFICATION, TEMPLATE_WELCOME};
use crate::errors::{AppError, AppResult};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([a-zA-Z0-9_]+)\s*\}\}").expect("valid placeholder pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmailTemplate {
    pub name: &'static str,
    pub subject: &'static str,
    pub body: &'static str,
}

/// Subject and body with placeholders filled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

static TEMPLATES: &[EmailTemplate] = &[
    EmailTemplate {
        name: TEMPLATE_WELCOME,
        subject: "Welkom bij BitBeheer, {{name}}",
        body: "Beste {{name}},\n\n\
               Bedankt voor je registratie bij BitBeheer. Je kunt nu inloggen met {{email}}.\n\n\
               Met vriendelijke groet,\nBitBeheer",
    },
    EmailTemplate {
        name: TEMPLATE_CONTACT_NOTIFICATION,
        subject: "Nieuw contactverzoek ({{category}}) van {{name}}",
        body: "Naam: {{name}}\n\
               E-mail: {{email}}\n\
               Categorie: {{category}}\n\n\
               Bericht:\n{{message}}\n\n\
               {{fields}}",
    },
    EmailTemplate {
        name: TEMPLATE_CONTACT_CONFIRMATION,
        subject: "We hebben je bericht ontvangen",
        body: "Beste {{name}},\n\n\
               Bedankt voor je bericht. We nemen zo snel mogelijk contact met je op.\n\n\
               Je schreef:\n{{message}}\n\n\
               Met vriendelijke groet,\nBitBeheer",
    },
];

pub fn all() -> &'static [EmailTemplate] {
    TEMPLATES
}

pub fn find(name: &str) -> Option<&'static EmailTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Render the named template; unknown names are a 404.
pub fn render(name: &str, vars: &HashMap<String, String>) -> AppResult<RenderedEmail> {
    find(name)
        .map(|template| template.render(vars))
        .ok_or(AppError::NotFound)
}

impl EmailTemplate {
    /// Placeholder names used in subject or body, in order of first use.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for text in [self.subject, self.body] {
            for caps in PLACEHOLDER.captures_iter(text) {
                let name = caps[1].to_string();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Missing variables render as empty strings.
    pub fn render(&self, vars: &HashMap<String, String>) -> RenderedEmail {
        RenderedEmail {
            subject: fill(self.subject, vars),
            body: fill(self.body, vars),
        }
    }
}

fn fill(text: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}
