//! Markdown credits document

use crate::catalog::{Author, CatalogError};
use crate::resolver::{AttributionEntry, AttributionSet};

pub const HEADING: &str = "## Mod Attribution";

/// Render the whole set as a Markdown bullet list under [`HEADING`]
pub fn render(set: &AttributionSet) -> String {
    let mut out = String::from(HEADING);
    out.push('\n');
    for entry in set {
        out.push_str(&entry_line(entry));
    }
    out
}

/// One bullet line, newline included
pub fn entry_line(entry: &AttributionEntry) -> String {
    match (&entry.name, entry.failure()) {
        (Some(name), None) => format!(
            " * {} by {}\n",
            link(name, entry.website_url.as_deref()),
            author_list(&entry.authors)
        ),
        (_, failure) => format!(" * Project {} ({})\n", entry.project_id, failure_note(failure)),
    }
}

fn failure_note(failure: Option<&CatalogError>) -> String {
    match failure {
        Some(CatalogError::NotFound { .. }) => "unresolved: not found in catalog".to_string(),
        Some(CatalogError::Unavailable { reason, .. }) => format!("unresolved: catalog unavailable, {}", reason),
        Some(CatalogError::Malformed { reason, .. }) => format!("unresolved: unreadable catalog reply, {}", reason),
        None => "unresolved".to_string(),
    }
}

/// `[text](url)`, or the escaped text alone without a url
fn link(text: &str, url: Option<&str>) -> String {
    match url {
        Some(url) => format!("[{}]({})", escape(text), url),
        None => escape(text),
    }
}

/// Backslash-escape characters that would change the meaning of a list line
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// "A", "A and B", "A, B, and C"; authors with a profile are linked
pub fn author_list(authors: &[Author]) -> String {
    let names: Vec<String> = authors.iter().map(|a| link(&a.name, a.url.as_deref())).collect();
    match names.as_slice() {
        [] => "Unknown author".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogClient, ProjectMetadata};
    use crate::config::AttributorConfig;
    use crate::manifest::ModReference;
    use crate::resolver::resolve;
    use async_trait::async_trait;

    struct FixedCatalog;

    #[async_trait]
    impl CatalogClient for FixedCatalog {
        async fn fetch(&self, project_id: i64) -> Result<ProjectMetadata, CatalogError> {
            match project_id {
                1 => Ok(ProjectMetadata {
                    project_id,
                    name: "Zeta".into(),
                    authors: vec![Author::with_url("Alice", "https://www.curseforge.com/members/alice")],
                    website_url: Some("https://www.curseforge.com/minecraft/mc-mods/zeta".into()),
                }),
                2 => Ok(ProjectMetadata {
                    project_id,
                    name: "Alpha [Core]".into(),
                    authors: vec![Author::new("Bob"), Author::new("Carol"), Author::new("Dan")],
                    website_url: None,
                }),
                3 => Ok(ProjectMetadata {
                    project_id,
                    name: "Mystery".into(),
                    authors: vec![],
                    website_url: Some("https://example.com/mystery".into()),
                }),
                _ => Err(CatalogError::Unavailable {
                    project_id,
                    reason: "timed out".into(),
                }),
            }
        }
    }

    fn plain(names: &[&str]) -> Vec<Author> {
        names.iter().map(|&n| Author::new(n)).collect()
    }

    #[test]
    fn test_author_lists() {
        assert_eq!(author_list(&[]), "Unknown author");
        assert_eq!(author_list(&plain(&["Alice"])), "Alice");
        assert_eq!(author_list(&plain(&["Alice", "Bob"])), "Alice and Bob");
        assert_eq!(author_list(&plain(&["Alice", "Bob", "Carol"])), "Alice, Bob, and Carol");
        assert_eq!(author_list(&plain(&["A", "B", "C", "D"])), "A, B, C, and D");
    }

    #[test]
    fn test_authors_with_profiles_are_linked() {
        let authors = vec![
            Author::with_url("mezz", "https://www.curseforge.com/members/mezz"),
            Author::new("helper_bot"),
        ];

        assert_eq!(
            author_list(&authors),
            "[mezz](https://www.curseforge.com/members/mezz) and helper\\_bot"
        );
        assert_eq!(
            author_list(&[Author::with_url("[x]", "https://x")]),
            "[\\[x\\]](https://x)"
        );
    }

    #[tokio::test]
    async fn test_render_document() {
        let references: Vec<ModReference> = [1, 2, 9, 3, 1].iter().map(|&p| ModReference::new(p, 0)).collect();
        let set = resolve(&references, &FixedCatalog, &AttributorConfig::default()).await;

        assert_eq!(
            render(&set),
            "## Mod Attribution\n\
             \x20* Alpha \\[Core\\] by Bob, Carol, and Dan\n\
             \x20* [Mystery](https://example.com/mystery) by Unknown author\n\
             \x20* [Zeta](https://www.curseforge.com/minecraft/mc-mods/zeta) by [Alice](https://www.curseforge.com/members/alice)\n\
             \x20* Project 9 (unresolved: catalog unavailable, timed out)\n"
        );
    }

    #[test]
    fn test_names_are_escaped_with_and_without_link() {
        assert_eq!(link("A [B]", Some("https://x")), "[A \\[B\\]](https://x)");
        assert_eq!(link("*Fancy* _Mod_", None), "\\*Fancy\\* \\_Mod\\_");
        assert_eq!(escape("plain name"), "plain name");
    }

    #[test]
    fn test_empty_set_renders_heading_only() {
        assert_eq!(render(&AttributionSet::default()), "## Mod Attribution\n");
    }
}
