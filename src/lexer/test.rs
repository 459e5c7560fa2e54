// Tests for multi-path lexer
//
//  Copyright (C) 2014-2023 Ryan Specialty, LLC.
//
//  This file is part of forkscan.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.


use super::*;
use crate::grammar::{GrammarBuilder, Part, Production};
use std::cell::RefCell;

type Sut = Lexer;

fn t(name: &str, pattern: &str) -> Terminal {
    Terminal::new(name, pattern).unwrap()
}

fn lit(name: &str, text: &str) -> Terminal {
    Terminal::literal(name, text).unwrap()
}

fn p<const N: usize>(name: &str, parts: [Part; N]) -> Production {
    Production::new(name, parts)
}

fn tp(name: &str) -> Part {
    Part::terminal(name)
}

fn pp(name: &str) -> Part {
    Part::production(name)
}

fn path(n: u32) -> PathId {
    PathId::new(n)
}

/// `path:TERMINAL:value@line:col`
fn show(sut: &Sut, tok: &Token) -> String {
    format!(
        "{}:{}:{}@{}:{}",
        tok.path().as_u32(),
        tok.terminal().name(),
        sut.resolve(tok.value()).unwrap(),
        tok.line(),
        tok.col(),
    )
}

fn show_batch(sut: &Sut, batch: &[Token]) -> Vec<String> {
    batch.iter().map(|tok| show(sut, tok)).collect()
}

/// Drive `sut` to completion,
///   rendering every batch.
fn scan(sut: &mut Sut) -> Vec<Vec<String>> {
    let mut batches = Vec::new();

    while let Some(batch) = sut.next_batch() {
        batches.push(show_batch(sut, &batch));
    }

    batches
}

fn sut_with(config: LexerConfig, grammar: Grammar, src: &str) -> Sut {
    let mut sut = Sut::new(config);

    sut.set_active_grammar(grammar);
    sut.load_source(SourceContainer::new(src));
    sut.reset().unwrap();

    sut
}

fn sut_for(grammar: Grammar, src: &str) -> Sut {
    sut_with(LexerConfig::default(), grammar, src)
}

fn lifecycle() -> LexerConfig {
    LexerConfig::default().with_lexer_path_tokens(true)
}

fn words() -> Grammar {
    GrammarBuilder::new("words")
        .terminal(t("WORD", "[a-z]+"))
        .terminal(t("WS", " +").skip())
        .build()
        .unwrap()
}

fn keywords() -> Grammar {
    GrammarBuilder::new("kw")
        .terminal(lit("KEYWORD", "if"))
        .terminal(t("IDENTIFIER", "[a-zA-Z]+"))
        .build()
        .unwrap()
}

fn owned(expected: Vec<Vec<&str>>) -> Vec<Vec<String>> {
    expected
        .into_iter()
        .map(|b| b.into_iter().map(String::from).collect())
        .collect()
}

#[test]
fn single_match_does_not_split_on_shorter_terminal() {
    let grammar = GrammarBuilder::new("g")
        .terminal(t("IDENTIFIER", "[a-zA-Z_][a-zA-Z0-9_]*"))
        .terminal(t("NUMBER", "[0-9]+"))
        .build()
        .unwrap();

    let mut sut = sut_for(grammar, "x1");

    assert_eq!(
        owned(vec![vec!["0:IDENTIFIER:x1@0:0"], vec![]]),
        scan(&mut sut),
    );
}

#[test]
fn ambiguous_match_forks_within_same_batch() {
    let mut sut = sut_for(keywords(), "if");

    let batch = sut.next_batch().unwrap();

    assert_eq!(
        vec!["0:KEYWORD:if@0:0", "1:IDENTIFIER:if@0:0"],
        show_batch(&sut, &batch),
    );

    // Each path consumed its own match.
    assert_eq!(
        vec![(0, 0, 2), (1, 0, 2)],
        sut.active_paths()
            .map(|p| (p.id().as_u32(), p.line(), p.col()))
            .collect::<Vec<_>>(),
    );
}

#[test]
fn reconverged_paths_merge_into_oldest() {
    let mut sut = sut_with(lifecycle(), keywords(), "if");

    assert_eq!(
        owned(vec![
            vec!["0:KEYWORD:if@0:0", "1:IDENTIFIER:if@0:0"],
            vec!["1:LEXERPATH_MERGE:0@0:2"],
        ]),
        scan(&mut sut),
    );
}

#[test]
fn lifecycle_tokens_omitted_by_default() {
    let mut sut = sut_for(keywords(), "if");

    assert_eq!(
        owned(vec![
            vec!["0:KEYWORD:if@0:0", "1:IDENTIFIER:if@0:0"],
            vec![],
        ]),
        scan(&mut sut),
    );
}

#[test]
fn exhausted_path_closes_silently() {
    let mut sut = sut_for(words(), "ab\n");

    assert_eq!(
        Some(vec!["0:WORD:ab@0:0".to_string()]),
        sut.next_batch().map(|b| show_batch(&sut, &b)),
    );

    // Skips to the empty final line and closes.
    assert_eq!(Some(vec![]), sut.next_batch());
    assert_eq!(0, sut.active_paths().count());

    assert_eq!(None, sut.next_batch());
    assert_eq!(None, sut.next_batch());
}

#[test]
fn empty_source_closes_on_first_step() {
    let mut sut = sut_for(words(), "");

    assert_eq!(owned(vec![vec![]]), scan(&mut sut));
}

#[test]
fn unmatched_input_emits_unknown_and_continues() {
    let mut sut = sut_for(words(), "a#b");

    assert_eq!(
        owned(vec![
            vec!["0:WORD:a@0:0"],
            vec!["0:UNKNOWN:#@0:1"],
            vec!["0:WORD:b@0:2"],
            vec![],
        ]),
        scan(&mut sut),
    );
}

#[test]
fn unknown_consumes_whole_character() {
    let mut sut = sut_for(words(), "éa");

    assert_eq!(
        owned(vec![vec!["0:UNKNOWN:é@0:0"], vec!["0:WORD:a@0:2"], vec![]]),
        scan(&mut sut),
    );
}

#[test]
fn advances_across_lines() {
    let mut sut = sut_for(words(), "ab\r\n\ncd");

    assert_eq!(
        owned(vec![vec!["0:WORD:ab@0:0"], vec!["0:WORD:cd@2:0"], vec![]]),
        scan(&mut sut),
    );
}

#[test]
fn token_span_covers_match() {
    let mut sut = sut_for(words(), "abc de");

    let batches = sut.next_tokens().collect::<Vec<_>>();
    let toks = batches.iter().flatten().collect::<Vec<_>>();

    assert_eq!(
        vec![Span::new(0, 0, 3), Span::new(0, 3, 1), Span::new(0, 4, 2)],
        toks.iter().map(|tok| tok.span()).collect::<Vec<_>>(),
    );
    assert!(toks[1].terminal().is_skip());
}

#[test]
fn order_important_terminal_is_primary() {
    let grammar = GrammarBuilder::new("g")
        .terminal(t("IDENTIFIER", "[a-z]+"))
        .terminal(lit("KEYWORD", "if").ordered(0))
        .build()
        .unwrap();

    let mut sut = sut_for(grammar, "if");
    let batch = sut.next_batch().unwrap();

    assert_eq!(
        vec!["0:KEYWORD:if@0:0", "1:IDENTIFIER:if@0:0"],
        show_batch(&sut, &batch),
    );
}

#[test]
fn fork_refused_at_max_paths() {
    let config = LexerConfig::default().with_max_paths(1);
    let mut sut = sut_with(config, keywords(), "if");

    assert_eq!(
        owned(vec![vec!["0:KEYWORD:if@0:0"], vec![]]),
        scan(&mut sut),
    );
}

#[test]
fn invalidated_path_released_next_step() {
    let mut sut = sut_with(lifecycle(), keywords(), "if");
    sut.next_batch();

    assert!(sut.invalidate_lexer_path(path(1)));
    assert!(!sut.invalidate_lexer_path(path(1)));
    assert!(!sut.invalidate_lexer_path(path(42)));

    assert_eq!(
        owned(vec![vec!["1:LEXERPATH_REMOVED:@0:2"]]),
        scan(&mut sut),
    );
}

#[test]
fn pending_invalidation_flushed_even_without_active_paths() {
    let mut sut = sut_with(lifecycle(), words(), "a");
    sut.next_batch();

    assert!(sut.invalidate_lexer_path(path(0)));
    assert_eq!(0, sut.active_paths().count());

    assert_eq!(
        owned(vec![vec!["0:LEXERPATH_REMOVED:@0:1"]]),
        scan(&mut sut),
    );
    assert_eq!(0, sut.pool_stats().outstanding());
}

#[test]
fn pool_records_reclaimed_by_end_of_scan() {
    let mut sut = sut_for(keywords(), "if if");

    scan(&mut sut);

    let stats = sut.pool_stats();
    assert!(stats.acquired > 1);
    assert_eq!(stats.acquired, stats.released);
}

#[test]
fn reset_restarts_scan_deterministically() {
    let mut sut = sut_with(lifecycle(), keywords(), "if x?");

    let first = scan(&mut sut);

    sut.reset().unwrap();
    let second = scan(&mut sut);

    assert_eq!(first, second);
}

#[test]
fn reset_mid_scan_releases_outstanding_paths() {
    let mut sut = sut_for(keywords(), "if if");
    sut.next_batch();

    assert_eq!(2, sut.pool_stats().outstanding());

    sut.reset().unwrap();

    // Only the new start path.
    assert_eq!(1, sut.pool_stats().outstanding());
    assert_eq!(
        vec![path(0)],
        sut.active_paths().map(LexerPath::id).collect::<Vec<_>>(),
    );
}

#[test]
fn reset_requires_grammar_and_source() {
    let mut sut = Sut::default();
    assert_eq!(Err(LexerError::NoActiveGrammar), sut.reset());

    sut.set_active_grammar(words());
    assert_eq!(Err(LexerError::NoSource), sut.reset());

    sut.load_source(SourceContainer::new("a"));
    assert_eq!(Ok(()), sut.reset());
}

#[test]
fn reset_rejects_undefined_delegation() {
    let grammar = GrammarBuilder::new("g")
        .terminal(t("A", "a"))
        .production(p("x", [tp("A")]).context("missing"))
        .build()
        .unwrap();

    let mut sut = Sut::default();
    sut.set_active_grammar(grammar);
    sut.load_source(SourceContainer::new("a"));

    assert_eq!(
        Err(LexerError::Grammar(GrammarError::UndefinedGrammar {
            production: "x".into(),
            context: "missing".into(),
        })),
        sut.reset(),
    );
}

#[test]
fn dispose_releases_everything() {
    let mut sut = sut_for(keywords(), "if");
    sut.next_batch();

    sut.dispose();

    assert_eq!(None, sut.next_batch());
    assert_eq!(PoolStats::default(), sut.pool_stats());
    assert!(sut.source().is_none());
    assert_eq!(Err(LexerError::NoSource), sut.reset());
}

#[test]
fn grammar_selection_by_name() {
    let mut sut = Sut::default();
    assert_eq!(None, sut.active_grammar_name());

    sut.set_active_grammar(words());
    sut.add_grammar(keywords());
    assert_eq!(Some("words"), sut.active_grammar_name());

    assert_eq!(Ok(()), sut.select_grammar("kw"));
    assert_eq!(Some("kw"), sut.active_grammar_name());

    assert_eq!(
        Err(LexerError::UnknownGrammar("nope".into())),
        sut.select_grammar("nope"),
    );
    assert_eq!(Some("kw"), sut.active_grammar_name());
}

#[test]
fn context_state_defaults_to_false() {
    let mut sut = Sut::default();

    assert!(!sut.get_context_state("strict"));

    sut.set_context_state("strict", true);
    assert!(sut.get_context_state("strict"));

    sut.set_context_state("strict", false);
    assert!(!sut.get_context_state("strict"));
    assert_eq!(1, sut.context_state().len());
}

// Embedded grammars
// =================

fn html() -> Grammar {
    GrammarBuilder::new("html")
        .terminal(lit("OPEN", "<style>"))
        .terminal(lit("CLOSE", "</style>"))
        .terminal(t("TEXT", "[a-z]+"))
        .production(p("doc", [tp("OPEN"), pp("style"), tp("CLOSE")]))
        .production(
            p("style", [tp("IDENT"), tp("COLON"), tp("IDENT"), tp("SEMI")])
                .context("css"),
        )
        .start_production("doc")
        .build()
        .unwrap()
}

fn css() -> Grammar {
    GrammarBuilder::new("css")
        .terminal(t("IDENT", "[a-z]+"))
        .terminal(lit("COLON", ":"))
        .terminal(lit("SEMI", ";"))
        .terminal(t("WS", " +").skip())
        .build()
        .unwrap()
}

fn governing(sut: &Sut, id: PathId) -> Option<&str> {
    sut.valid_terminals_for(id).map(|(g, _)| g.name())
}

fn valid_names(sut: &Sut, id: PathId) -> Vec<String> {
    sut.valid_terminals_for(id)
        .map(|(g, valid)| {
            valid
                .iter()
                .filter_map(|t| g.terminal_by_id(t))
                .map(|t| t.name().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn embedded_region_lexed_by_embedded_grammar_only() {
    let mut sut = Sut::default();
    sut.set_active_grammar(html());
    sut.add_grammar(css());
    sut.load_source(SourceContainer::new("<style>color: red;</style>"));
    sut.reset().unwrap();

    assert_eq!(Some("html"), governing(&sut, path(0)));

    let first = sut.next_batch().map(|b| show_batch(&sut, &b));
    assert_eq!(Some(vec!["0:OPEN:<style>@0:0".to_string()]), first);

    // Entered as soon as the region is expected.
    assert_eq!(Some("css"), governing(&sut, path(0)));
    assert_eq!(vec!["IDENT", "WS"], valid_names(&sut, path(0)));

    assert_eq!(
        owned(vec![
            vec!["0:IDENT:color@0:7"],
            vec!["0:COLON::@0:12"],
            vec!["0:WS: @0:13"],
            vec!["0:IDENT:red@0:14"],
            vec!["0:SEMI:;@0:17"],
            vec!["0:CLOSE:</style>@0:18"],
            vec![],
        ]),
        scan(&mut sut),
    );
}

#[test]
fn embedded_region_left_when_production_completes() {
    let mut sut = Sut::default();
    sut.set_active_grammar(html());
    sut.add_grammar(css());
    sut.load_source(SourceContainer::new("<style>a:b;</style>"));
    sut.reset().unwrap();

    for _ in 0..4 {
        sut.next_batch();
        assert_eq!(Some("css"), governing(&sut, path(0)));
    }

    sut.next_batch();
    assert_eq!(Some("html"), governing(&sut, path(0)));
}

#[test]
fn parse_returns_completed_productions() {
    let mut sut = Sut::default();
    sut.set_active_grammar(css());
    sut.add_grammar(html());

    let matches = sut
        .parse("html", SourceContainer::new("<style>color: red;</style>"))
        .unwrap();

    assert_eq!(
        vec![
            ("html", "style", "color: red;", Span::new(0, 7, 5)),
            ("html", "doc", "<style>color: red;</style>", Span::new(0, 0, 7)),
        ],
        matches
            .iter()
            .map(|m| (m.grammar(), m.production(), m.text(), m.span()))
            .collect::<Vec<_>>(),
    );
    assert!(matches.iter().all(|m| m.path() == path(0)));
}

#[test]
fn parse_unknown_grammar() {
    let mut sut = Sut::default();
    sut.set_active_grammar(words());

    assert_eq!(
        Err(LexerError::UnknownGrammar("html".into())),
        sut.parse("html", SourceContainer::new("")),
    );
}

#[test]
fn embedded_region_entered_through_enclosing_production() {
    let markup = GrammarBuilder::new("html")
        .terminal(lit("OPEN", "<style>"))
        .terminal(lit("CLOSE", "</style>"))
        .terminal(t("TEXT", "[a-z]+"))
        .production(p("doc", [tp("OPEN"), pp("body"), tp("CLOSE")]))
        .production(p("body", [pp("style")]))
        .production(
            p("style", [tp("IDENT"), tp("COLON"), tp("IDENT"), tp("SEMI")])
                .context("css"),
        )
        .start_production("doc")
        .build()
        .unwrap();

    let mut sut = Sut::default();
    sut.set_active_grammar(markup);
    sut.add_grammar(css());
    sut.load_source(SourceContainer::new("<style>a:b;</style>"));
    sut.reset().unwrap();

    sut.next_batch();
    assert_eq!(Some("css"), governing(&sut, path(0)));
    assert_eq!(vec!["IDENT", "WS"], valid_names(&sut, path(0)));

    assert_eq!(
        owned(vec![
            vec!["0:IDENT:a@0:7"],
            vec!["0:COLON::@0:8"],
            vec!["0:IDENT:b@0:9"],
            vec!["0:SEMI:;@0:10"],
            vec!["0:CLOSE:</style>@0:11"],
            vec![],
        ]),
        scan(&mut sut),
    );

    let matches = sut
        .parse("html", SourceContainer::new("<style>a:b;</style>"))
        .unwrap();

    assert_eq!(
        vec![
            ("style", "a:b;"),
            ("body", "a:b;"),
            ("doc", "<style>a:b;</style>"),
        ],
        matches
            .iter()
            .map(|m| (m.production(), m.text()))
            .collect::<Vec<_>>(),
    );
}

fn js() -> Grammar {
    GrammarBuilder::new("js")
        .terminal(t("NAME", "[a-z]+"))
        .terminal(lit("EQ", "="))
        .terminal(lit("SEMI", ";"))
        .terminal(t("WS", " +").skip())
        .build()
        .unwrap()
}

/// A region that is either css or js.
fn polyglot() -> Sut {
    let markup = GrammarBuilder::new("html")
        .terminal(lit("OPEN", "<code>"))
        .terminal(lit("CLOSE", "</code>"))
        .production(p("doc", [tp("OPEN"), pp("region"), tp("CLOSE")]))
        .production(
            p("region", [tp("IDENT"), tp("COLON"), tp("IDENT"), tp("SEMI")])
                .context("css"),
        )
        .production(
            p("region", [tp("NAME"), tp("EQ"), tp("NAME"), tp("SEMI")])
                .context("js"),
        )
        .start_production("doc")
        .build()
        .unwrap();

    let mut sut = Sut::default();
    sut.add_grammar(markup);
    sut.add_grammar(css());
    sut.add_grammar(js());

    sut
}

#[test]
fn embedded_region_forks_per_candidate_grammar() {
    let mut sut = polyglot();
    sut.select_grammar("html").unwrap();
    sut.load_source(SourceContainer::new("<code>a:b;</code>"));
    sut.reset().unwrap();

    let first = sut.next_batch().map(|b| show_batch(&sut, &b));
    assert_eq!(
        Some(vec![
            "0:OPEN:<code>@0:0".to_string(),
            "1:OPEN:<code>@0:0".to_string(),
        ]),
        first,
    );

    assert_eq!(Some("css"), governing(&sut, path(0)));
    assert_eq!(Some("js"), governing(&sut, path(1)));

    assert_eq!(
        owned(vec![
            vec!["0:IDENT:a@0:6", "1:NAME:a@0:6"],
            vec!["0:COLON::@0:7", "1:UNKNOWN::@0:7"],
            vec!["0:IDENT:b@0:8", "1:NAME:b@0:8"],
            vec!["0:SEMI:;@0:9"],
            vec!["0:CLOSE:</code>@0:10"],
            vec![],
        ]),
        scan(&mut sut),
    );
}

#[test]
fn embedded_region_recognized_in_whichever_grammar_fits() {
    let mut sut = polyglot();

    let summarize = |matches: Vec<ProductionMatch>| {
        matches
            .iter()
            .map(|m| (m.path().as_u32(), m.production().to_string()))
            .collect::<Vec<_>>()
    };

    let styled = sut.parse("html", SourceContainer::new("<code>a:b;</code>"));
    assert_eq!(
        vec![(0, "region".to_string()), (0, "doc".to_string())],
        summarize(styled.unwrap()),
    );

    let scripted =
        sut.parse("html", SourceContainer::new("<code>a=b;</code>"));
    assert_eq!(
        vec![(1, "region".to_string()), (1, "doc".to_string())],
        summarize(scripted.unwrap()),
    );
}

#[test]
fn optional_embedded_region_keeps_local_interpretation() {
    let markup = GrammarBuilder::new("html")
        .terminal(lit("OPEN", "<style>"))
        .terminal(lit("CLOSE", "</style>"))
        .terminal(t("TEXT", "[a-z]+"))
        .production(p("doc", [tp("OPEN"), pp("content"), tp("CLOSE")]))
        .production(p("content", [tp("TEXT")]))
        .production(p("content", [pp("style")]))
        .production(
            p("style", [tp("IDENT"), tp("COLON"), tp("IDENT"), tp("SEMI")])
                .context("css"),
        )
        .start_production("doc")
        .build()
        .unwrap();

    let mut sut = Sut::default();
    sut.add_grammar(markup);
    sut.add_grammar(css());

    sut.select_grammar("html").unwrap();
    sut.load_source(SourceContainer::new("<style>abc</style>"));
    sut.reset().unwrap();

    sut.next_batch();
    assert_eq!(Some("css"), governing(&sut, path(0)));
    assert_eq!(Some("html"), governing(&sut, path(1)));
    assert_eq!(vec!["TEXT"], valid_names(&sut, path(1)));

    let matches = sut
        .parse("html", SourceContainer::new("<style>abc</style>"))
        .unwrap();

    assert_eq!(
        vec![(1, "content", "abc"), (1, "doc", "<style>abc</style>")],
        matches
            .iter()
            .map(|m| (m.path().as_u32(), m.production(), m.text()))
            .collect::<Vec<_>>(),
    );
}

#[test]
fn paths_in_different_contexts_not_merged() {
    let outer = GrammarBuilder::new("outer")
        .terminal(lit("A", "a"))
        .terminal(lit("B", "a"))
        .terminal(lit("C", "b"))
        .production(p("x", [tp("A"), pp("inner")]))
        .production(p("inner", [tp("WORD")]).context("inner"))
        .production(p("y", [tp("B")]))
        .production(p("z", [tp("C")]))
        .start_production("x")
        .start_production("y")
        .start_production("z")
        .build()
        .unwrap();

    let inner = GrammarBuilder::new("inner")
        .terminal(t("WORD", "[a-z]+"))
        .build()
        .unwrap();

    let mut sut = Sut::new(lifecycle());
    sut.set_active_grammar(outer);
    sut.add_grammar(inner);
    sut.load_source(SourceContainer::new("ab"));
    sut.reset().unwrap();

    let first = sut.next_batch().map(|b| show_batch(&sut, &b));
    assert_eq!(
        Some(vec!["0:A:a@0:0".to_string(), "1:B:a@0:0".to_string()]),
        first,
    );

    // Same position,
    //   different context stacks.
    assert_eq!(Some("inner"), governing(&sut, path(0)));
    assert_eq!(Some("outer"), governing(&sut, path(1)));

    // Once both have left the embedded context they are
    //   indistinguishable.
    assert_eq!(
        owned(vec![
            vec!["0:WORD:b@0:1", "1:C:b@0:1"],
            vec!["1:LEXERPATH_MERGE:0@0:2"],
        ]),
        scan(&mut sut),
    );
}

// Production recognition
// ======================

#[test]
fn syntactic_ambiguity_forks_paths() {
    let grammar = GrammarBuilder::new("g")
        .terminal(t("ID", "[a-z]+"))
        .terminal(t("WS", " +").skip())
        .production(p("decl", [tp("ID"), tp("ID")]))
        .production(p("expr", [tp("ID")]))
        .start_production("decl")
        .start_production("expr")
        .build()
        .unwrap();

    let mut sut = sut_for(grammar, "x y");

    assert_eq!(
        owned(vec![
            vec!["0:ID:x@0:0", "1:ID:x@0:0"],
            vec!["0:WS: @0:1", "1:WS: @0:1"],
            vec!["0:ID:y@0:2", "1:ID:y@0:2", "2:ID:y@0:2"],
            vec![],
        ]),
        scan(&mut sut),
    );
}

#[test]
fn syntactic_ambiguity_matches_by_path() {
    let grammar = GrammarBuilder::new("g")
        .terminal(t("ID", "[a-z]+"))
        .terminal(t("WS", " +").skip())
        .production(p("decl", [tp("ID"), tp("ID")]))
        .production(p("expr", [tp("ID")]))
        .start_production("decl")
        .start_production("expr")
        .build()
        .unwrap();

    let mut sut = Sut::default();
    sut.add_grammar(grammar);

    let matches = sut.parse("g", SourceContainer::new("x y")).unwrap();

    // Path 2 duplicated path 0 and was merged away.
    assert_eq!(
        vec![(0, "decl", "x y"), (1, "expr", "x")],
        matches
            .iter()
            .map(|m| (m.path().as_u32(), m.production(), m.text()))
            .collect::<Vec<_>>(),
    );
}

#[test]
fn valid_terminals_follow_recognition_state() {
    let grammar = GrammarBuilder::new("g")
        .terminal(lit("KW", "if"))
        .terminal(t("ID", "[a-z]+"))
        .terminal(t("WS", " +").skip())
        .production(p("cond", [tp("KW"), tp("ID")]))
        .start_production("cond")
        .build()
        .unwrap();

    let mut sut = sut_with(lifecycle(), grammar, "if if");
    assert_eq!(vec!["KW", "WS"], valid_names(&sut, path(0)));

    // No fork on `ID`,
    //   since it cannot begin `cond`.
    let first = sut.next_batch().map(|b| show_batch(&sut, &b));
    assert_eq!(Some(vec!["0:KW:if@0:0".to_string()]), first);

    assert_eq!(vec!["ID", "WS"], valid_names(&sut, path(0)));

    assert_eq!(
        owned(vec![vec!["0:WS: @0:2"], vec!["0:ID:if@0:3"], vec![]]),
        scan(&mut sut),
    );
}

#[test]
fn valid_terminals_unrestricted_without_productions() {
    let sut = sut_for(keywords(), "if");

    assert_eq!(vec!["KEYWORD", "IDENTIFIER"], valid_names(&sut, path(0)));
}

#[test]
fn rejected_path_invalidated_when_another_is_viable() {
    let grammar = GrammarBuilder::new("g")
        .terminal(t("ID", "[a-z]+"))
        .terminal(t("NUM", "[0-9]+"))
        .terminal(t("WS", " +").skip())
        .production(p("a", [tp("ID"), tp("NUM")]))
        .production(p("b", [tp("ID"), tp("ID")]))
        .start_production("a")
        .start_production("b")
        .build()
        .unwrap();

    let mut sut = sut_with(lifecycle(), grammar, "x y");

    // Path 0 expects `NUM` and so lexes `y` only to be rejected.
    assert_eq!(
        owned(vec![
            vec!["0:ID:x@0:0", "1:ID:x@0:0"],
            vec!["0:WS: @0:1", "1:WS: @0:1"],
            vec!["0:ID:y@0:2", "1:ID:y@0:2"],
            vec!["0:LEXERPATH_REMOVED:@0:3"],
        ]),
        scan(&mut sut),
    );
}

#[test]
fn unmatched_input_does_not_invalidate_rejected_paths() {
    let grammar = GrammarBuilder::new("g")
        .terminal(lit("AB", "ab"))
        .terminal(lit("A", "a"))
        .terminal(lit("B", "b"))
        .production(p("pair", [tp("A"), tp("A")]))
        .production(p("one", [tp("AB")]))
        .start_production("pair")
        .start_production("one")
        .build()
        .unwrap();

    let mut sut = sut_with(lifecycle(), grammar, "ab#");

    // Path 1 rejects `b` while path 0 lexes nothing;
    //   path 1 recovers rather than being removed.
    assert_eq!(
        owned(vec![
            vec!["0:AB:ab@0:0", "1:A:a@0:0"],
            vec!["0:UNKNOWN:#@0:2", "1:B:b@0:1"],
            vec!["1:UNKNOWN:#@0:2"],
            vec![],
        ]),
        scan(&mut sut),
    );
}

fn pairs() -> GrammarBuilder {
    GrammarBuilder::new("g")
        .terminal(t("ID", "[a-z]+"))
        .terminal(t("NUM", "[0-9]+"))
        .terminal(t("WS", " +").skip())
        .start_production("pair")
}

#[test]
fn recovers_when_every_path_rejects() {
    let grammar = pairs()
        .production(p("pair", [tp("ID"), tp("NUM")]))
        .build()
        .unwrap();

    let mut sut = Sut::default();
    sut.add_grammar(grammar);

    let matches = sut.parse("g", SourceContainer::new("a b 1")).unwrap();

    assert_eq!(
        vec![("pair", "b 1")],
        matches
            .iter()
            .map(|m| (m.production(), m.text()))
            .collect::<Vec<_>>(),
    );
}

#[test]
fn production_spans_lines() {
    let grammar = pairs()
        .production(p("pair", [tp("ID"), tp("NUM")]))
        .build()
        .unwrap();

    let mut sut = Sut::default();
    sut.add_grammar(grammar);

    let matches = sut.parse("g", SourceContainer::new("a\n  12")).unwrap();

    assert_eq!(1, matches.len());
    assert_eq!("a\n  12", matches[0].text());
    assert_eq!(Span::new(0, 0, 1), matches[0].span());
}

#[test]
fn callback_observes_completed_production() {
    let grammar = pairs()
        .production(p("pair", [tp("ID"), tp("NUM")]))
        .build()
        .unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_cb = Rc::clone(&seen);

    let mut sut = Sut::default();
    sut.add_grammar(grammar);
    sut.set_context_state("strict", true);

    sut.register_callback("pair", move |text, state, span| {
        seen_cb
            .borrow_mut()
            .push((text.to_string(), state.get("strict"), span));
    });

    sut.parse("g", SourceContainer::new("a 1 b 2")).unwrap();

    assert_eq!(
        vec![
            ("a 1".to_string(), true, Span::new(0, 0, 1)),
            ("b 2".to_string(), true, Span::new(0, 4, 1)),
        ],
        *seen.borrow(),
    );
}

#[test]
fn callback_replaced_and_cleared() {
    let grammar = pairs()
        .production(p("pair", [tp("ID"), tp("NUM")]))
        .build()
        .unwrap();

    let count = Rc::new(RefCell::new((0, 0)));
    let (c1, c2) = (Rc::clone(&count), Rc::clone(&count));

    let mut sut = Sut::default();
    sut.add_grammar(grammar);

    sut.register_callback("pair", move |_, _, _| c1.borrow_mut().0 += 1);
    sut.register_callback("pair", move |_, _, _| c2.borrow_mut().1 += 1);

    sut.parse("g", SourceContainer::new("a 1")).unwrap();
    assert_eq!((0, 1), *count.borrow());

    sut.clear_callbacks();

    sut.parse("g", SourceContainer::new("a 1")).unwrap();
    assert_eq!((0, 1), *count.borrow());
}

#[test]
fn guarded_production_requires_flag() {
    let grammar = pairs()
        .production(p("pair", [tp("ID"), tp("NUM")]).guard("strict"))
        .build()
        .unwrap();

    let mut sut = Sut::default();
    sut.add_grammar(grammar);

    let without = sut.parse("g", SourceContainer::new("a 1")).unwrap();
    assert!(without.is_empty());

    sut.set_context_state("strict", true);

    let with = sut.parse("g", SourceContainer::new("a 1")).unwrap();
    assert_eq!(1, with.len());
}

// Symbols
// =======

fn scoped() -> (Grammar, Grammar) {
    let outer = GrammarBuilder::new("outer")
        .terminal(lit("LET", "let"))
        .terminal(t("ID", "[xyz]+"))
        .terminal(t("WS", " +").skip())
        .terminal(lit("OPEN", "{"))
        .terminal(lit("CLOSE", "}"))
        .production(p("decl", [tp("LET"), tp("ID")]).binds(1))
        .production(p("block", [tp("OPEN"), pp("inner"), tp("CLOSE")]))
        .production(p("inner", [tp("REF")]).context("inner"))
        .start_production("decl")
        .start_production("block")
        .build()
        .unwrap();

    let inner = GrammarBuilder::new("inner")
        .terminal(t("REF", "[a-z]+"))
        .build()
        .unwrap();

    (outer, inner)
}

fn scoped_sut(src: &str) -> Sut {
    let (outer, inner) = scoped();

    let mut sut = Sut::default();
    sut.set_active_grammar(outer);
    sut.add_grammar(inner);
    sut.load_source(SourceContainer::new(src));
    sut.reset().unwrap();

    sut
}

#[test]
fn binding_declared_when_production_completes() {
    let mut sut = scoped_sut("let x");

    // `let`, then whitespace.
    sut.next_batch();
    sut.next_batch();
    assert_eq!(None, sut.lookup_symbol(path(0), "x"));

    sut.next_batch();
    assert_eq!(Some(Span::new(0, 4, 1)), sut.lookup_symbol(path(0), "x"));

    // Declarations belong to live paths only.
    sut.next_batch();
    assert_eq!(None, sut.lookup_symbol(path(0), "x"));
}

#[test]
fn explicit_declaration_at_path_position() {
    let mut sut = scoped_sut("let x");
    sut.next_batch();

    assert!(sut.declare_symbol(path(0), "y"));
    assert!(!sut.declare_symbol(path(5), "y"));

    assert_eq!(Some(Span::new(0, 3, 1)), sut.lookup_symbol(path(0), "y"));
    assert_eq!(None, sut.lookup_symbol(path(0), "z"));
    assert_eq!(None, sut.lookup_symbol(path(5), "y"));
}

#[test]
fn embedded_scope_sees_enclosing_declarations() {
    let mut sut = scoped_sut("let x {x}");

    // let, ws, x, ws, {
    for _ in 0..5 {
        sut.next_batch();
    }

    assert_eq!(Some("inner"), governing(&sut, path(0)));
    assert_eq!(Some(Span::new(0, 4, 1)), sut.lookup_symbol(path(0), "x"));

    assert!(sut.declare_symbol(path(0), "y"));
    assert_eq!(Some(Span::new(0, 7, 1)), sut.lookup_symbol(path(0), "y"));

    // Leaving the region closes its scope.
    sut.next_batch();
    assert_eq!(Some("outer"), governing(&sut, path(0)));
    assert_eq!(None, sut.lookup_symbol(path(0), "y"));
    assert_eq!(Some(Span::new(0, 4, 1)), sut.lookup_symbol(path(0), "x"));
}

#[test]
fn forks_inherit_declarations_independently() {
    let grammar = GrammarBuilder::new("g")
        .terminal(lit("KW", "if"))
        .terminal(t("ID", "[a-z]+"))
        .build()
        .unwrap();

    let mut sut = Sut::new(LexerConfig::default());
    sut.set_active_grammar(grammar);
    sut.load_source(SourceContainer::new("ifif"));
    sut.reset().unwrap();

    sut.declare_symbol(path(0), "a");
    sut.next_batch();

    assert!(sut.lookup_symbol(path(1), "a").is_some());

    sut.declare_symbol(path(1), "b");
    assert_eq!(None, sut.lookup_symbol(path(0), "b"));

    sut.invalidate_lexer_path(path(1));
    assert!(sut.lookup_symbol(path(0), "a").is_some());
}

#[test]
fn token_display() {
    let mut sut = sut_for(words(), "ab");
    let batch = sut.next_batch().unwrap();

    assert_eq!(
        format!("WORD {} at 0:0+2 on path #0", batch[0].value()),
        batch[0].to_string(),
    );
    assert!(!batch[0].is_lifecycle());
}
