//! Prompt templates for the rewrite step.
//!
//! A template is plain text with `{title}` and `{snippet}` placeholders. Substitution is
//! single-pass, so placeholder-looking text inside an article is never expanded.

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::RawArticle;

/// Template used by the scheduled update cycle
pub const DEFAULT_UPDATE_PROMPT: &str = r#"Você é um jornalista analítico e editor-chefe de um portal de notícias de direita. Seu estilo é direto e incisivo. Sua tarefa é criar uma nova matéria a partir do artigo de uma fonte externa, sem copiar frases do original.

Fonte Original:
- Título: "{title}"
- Trecho: "{snippet}"

Gere um objeto JSON com a seguinte estrutura:
- "novo_titulo": um título original e forte, que deixe clara a perspectiva de direita.
- "paragrafo_principal": um parágrafo de abertura (lead) com 3-4 frases, apresentando os fatos com linguagem enérgica.
- "pontos_chave": de 3 a 4 fatos principais do artigo, em uma lista de strings, diretos e sem rodeios.
- "analise": um parágrafo de análise (3-4 frases) com a perspectiva de direita explícita, conectando o evento à liberdade econômica, aos valores tradicionais ou à soberania nacional.

Responda estritamente no formato JSON."#;

/// Template used by the live (uncached) endpoint
pub const DEFAULT_LIVE_PROMPT: &str = r#"Você é um jornalista analítico de um portal de notícias de direita. Sua tarefa é receber um artigo de uma fonte externa e criar uma nova matéria a partir dele, adicionando valor e uma perspectiva própria. NÃO copie frases do original.

Fonte Original:
- Título: "{title}"
- Trecho: "{snippet}"

Gere um objeto JSON com a seguinte estrutura:
- "novo_titulo": um título original, impactante e otimizado para SEO.
- "paragrafo_principal": um parágrafo de abertura (lead) original, com 2-3 frases, apresentando os fatos mais importantes de forma direta.
- "pontos_chave": de 3 a 4 fatos principais do artigo, em uma lista de strings (quem, o que, onde, quando).
- "analise": um parágrafo de análise original (2-3 frases) explicando a importância desta notícia para o público de direita, conectando o evento a princípios como liberdade econômica, valores conservadores ou soberania nacional.

Responda estritamente no formato JSON."#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Resolve a template from configuration: inline text, then a file, then the built-in default.
    pub fn resolve(inline: Option<&str>, file: Option<&Path>, default: &str) -> Result<Self> {
        if let Some(text) = inline {
            return Ok(Self::new(text));
        }
        if let Some(path) = file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read prompt template: {}", path.display()))?;
            return Ok(Self::new(text));
        }
        Ok(Self::new(default))
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Whether the template references the article at all
    pub fn has_placeholders(&self) -> bool {
        self.template.contains("{title}") || self.template.contains("{snippet}")
    }

    pub fn render(&self, article: &RawArticle) -> String {
        let mut out = String::with_capacity(self.template.len() + article.snippet.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{title}") {
                out.push_str(&article.title);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{snippet}") {
                out.push_str(&article.snippet);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, snippet: &str) -> RawArticle {
        RawArticle {
            source: "Feed".to_string(),
            title: title.to_string(),
            link: "https://example.com".to_string(),
            pub_date: None,
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn render_substitutes_both_placeholders() {
        let t = PromptTemplate::new("T={title}; S={snippet}; again {title}");
        assert_eq!(
            t.render(&article("Hello", "World")),
            "T=Hello; S=World; again Hello"
        );
    }

    #[test]
    fn render_does_not_expand_placeholders_inside_values() {
        let t = PromptTemplate::new("{title}|{snippet}");
        assert_eq!(t.render(&article("{snippet}", "x")), "{snippet}|x");
    }

    #[test]
    fn render_keeps_other_braces() {
        let t = PromptTemplate::new("json: {\"a\": 1} {title}");
        assert_eq!(t.render(&article("T", "")), "json: {\"a\": 1} T");
    }

    #[test]
    fn builtin_templates_reference_the_article_and_fields() {
        for text in [DEFAULT_UPDATE_PROMPT, DEFAULT_LIVE_PROMPT] {
            let t = PromptTemplate::new(text);
            assert!(t.has_placeholders());
            for field in ["novo_titulo", "paragrafo_principal", "pontos_chave", "analise"] {
                assert!(text.contains(field), "missing {field}");
            }
        }
    }

    #[test]
    fn resolve_prefers_inline_then_file_then_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "from file {title}").unwrap();

        let inline = PromptTemplate::resolve(Some("inline"), Some(&path), "default").unwrap();
        assert_eq!(inline.as_str(), "inline");

        let file = PromptTemplate::resolve(None, Some(&path), "default").unwrap();
        assert_eq!(file.as_str(), "from file {title}");

        let fallback = PromptTemplate::resolve(None, None, "default").unwrap();
        assert_eq!(fallback.as_str(), "default");

        let missing = dir.path().join("missing.txt");
        assert!(PromptTemplate::resolve(None, Some(&missing), "default").is_err());
    }
}
