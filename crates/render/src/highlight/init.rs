//! One-time engine construction.

use super::config::{GrammarConfig, HighlightConfig};
use super::source::{ResourceSource, fetch_with_retry};
use super::syntect_engine::{SyntectEngine, load_theme};
use fenceline_core::FencelineError;
use std::sync::Arc;
use syntect::dumps;
use syntect::parsing::{Scope, SyntaxDefinition, SyntaxSet};

/// Builds the syntect engine: base syntaxes, fetched grammars, theme.
pub(super) async fn build_engine(
    config: &HighlightConfig,
    source: Arc<dyn ResourceSource>,
) -> Result<SyntectEngine, FencelineError> {
    let theme = load_theme(&config.theme)?;
    let base = base_syntaxes(config, &source).await?;

    let mut aliases = config.aliases.clone();
    let mut builder = base.into_builder();
    for grammar in &config.grammars {
        match load_grammar(grammar, &source, config).await {
            Ok(definition) => {
                log::info!(
                    "Registered grammar {} ({})",
                    grammar.name,
                    grammar.scope_name
                );
                for id in grammar.language_ids() {
                    aliases.remove(id);
                }
                builder.add(definition);
            }
            Err(err) if config.degrade_on_failure => {
                log::warn!("Skipping grammar {}: {}", grammar.name, err);
            }
            Err(err) => return Err(err),
        }
    }

    let engine = SyntectEngine::new(builder.build(), theme, aliases);
    verify_languages(&engine, config);
    Ok(engine)
}

async fn base_syntaxes(
    config: &HighlightConfig,
    source: &Arc<dyn ResourceSource>,
) -> Result<SyntaxSet, FencelineError> {
    let Some(location) = config.syntax_dump.as_deref() else {
        return Ok(SyntaxSet::load_defaults_newlines());
    };

    let loaded = fetch_with_retry(source, location, &config.retry)
        .await
        .and_then(|bytes| decode_dump(location, &bytes));
    match loaded {
        Ok(syntaxes) => {
            log::info!(
                "Loaded {} syntaxes from {}",
                syntaxes.syntaxes().len(),
                location
            );
            Ok(syntaxes)
        }
        Err(err) if config.degrade_on_failure => {
            log::warn!("Using bundled syntaxes, {} unusable: {}", location, err);
            Ok(SyntaxSet::load_defaults_newlines())
        }
        Err(err) => Err(err),
    }
}

/// Accepts both compressed and uncompressed dumps.
fn decode_dump(location: &str, bytes: &[u8]) -> Result<SyntaxSet, FencelineError> {
    dumps::from_reader::<SyntaxSet, _>(bytes)
        .or_else(|_| dumps::from_uncompressed_data::<SyntaxSet>(bytes))
        .map_err(|err| FencelineError::grammar_load(location, err.to_string()))
}

async fn load_grammar(
    grammar: &GrammarConfig,
    source: &Arc<dyn ResourceSource>,
    config: &HighlightConfig,
) -> Result<SyntaxDefinition, FencelineError> {
    let bytes = fetch_with_retry(source, &grammar.location, &config.retry).await?;
    let text = String::from_utf8(bytes)?;
    parse_grammar(grammar, &text)
}

fn parse_grammar(grammar: &GrammarConfig, text: &str) -> Result<SyntaxDefinition, FencelineError> {
    let mut definition = SyntaxDefinition::load_from_str(text, true, Some(&grammar.name))
        .map_err(|err| FencelineError::grammar_load(&grammar.name, err.to_string()))?;

    definition.scope = Scope::new(&grammar.scope_name).map_err(|err| {
        FencelineError::grammar_load(
            &grammar.name,
            format!("invalid scope name '{}': {:?}", grammar.scope_name, err),
        )
    })?;
    for id in grammar.language_ids() {
        if !definition.file_extensions.iter().any(|ext| ext == id) {
            definition.file_extensions.push(id.to_string());
        }
    }
    Ok(definition)
}

fn verify_languages(engine: &SyntectEngine, config: &HighlightConfig) {
    use super::HighlightEngine;

    for language in config.languages.iter().chain(&config.bundled_languages) {
        if !engine.supports(language) {
            log::warn!("No grammar for '{}', blocks will render as plain text", language);
        }
    }
    log::debug!(
        "Highlighter ready with {} syntaxes",
        engine.syntaxes().syntaxes().len()
    );
}
