use pretty_assertions::assert_eq;
use prunecss_lib::prune::{self, prune_file, PruneOptions};
use prunecss_lib::style::stylesheet;
use prunecss_lib::{prune_text, Config, PruneError, Rewrite, UsageSet, UsageSetBuilder};
use std::fs;

fn usage(tokens: &[&str]) -> UsageSet {
    tokens.iter().copied().collect()
}

fn pruned(css: &str, used: &[&str]) -> String {
    match prune_text(css, &usage(used)) {
        Rewrite::Unchanged => css.to_string(),
        Rewrite::Changed { text, .. } => text,
    }
}

const MESSY_SHEET: &str = r#"@charset "utf-8";
@import url("base.css");
/* .header { } is a comment */
body { margin: 0 }
.quote::before { content: "}"; }
@media (max-width: 600px) {
  .nav > li { display: block }
  /* inside */
  .unused-mobile { color: red }
}
@font-face { font-family: "X"; src: url(x.woff) }
@keyframes spin { from { transform: rotate(0) } to { transform: rotate(360deg) } }
.tail { color: blue /* unterminated"#;

#[test]
fn gaps_and_rules_rebuild_the_source() {
    let sheet = stylesheet::parse(MESSY_SHEET);
    let gaps = sheet.gaps();
    let mut rebuilt = String::new();
    for (gap, rule) in gaps.iter().zip(sheet.rules()) {
        rebuilt.push_str(gap.slice(MESSY_SHEET));
        rebuilt.push_str(rule.text());
    }
    rebuilt.push_str(gaps[gaps.len() - 1].slice(MESSY_SHEET));
    assert_eq!(rebuilt, MESSY_SHEET);
    assert!(sheet.unparsed().is_some());
}

#[test]
fn end_to_end_removes_only_the_unused_rule() {
    let result = prune_text(".a{x:1}\n.b{y:2}\n.c{z:3}", &usage(&[".a", ".c"]));
    assert_eq!(result.removed(), 1);
    assert_eq!(result.text(), Some(".a{x:1}\n\n.c{z:3}"));
}

#[test]
fn rules_without_class_or_id_are_never_removed() {
    let css = "body{m:0}\n:root{--c:red}\n*{box-sizing:border-box}\na:hover{x:1}\n\
               @font-face{font-family:x}\n@keyframes spin{from{a:1}to{a:2}}\n\
               @import url(a.css);\n@media print{h1{x:1}}";
    assert_eq!(prune_text(css, &UsageSet::default()), Rewrite::Unchanged);
}

#[test]
fn prefix_of_a_used_class_does_not_count() {
    assert_eq!(
        pruned(".btn{a:1}\n.btn-outline{b:2}", &[".btn"]),
        ".btn{a:1}\n"
    );
}

#[test]
fn compound_selectors_survive_on_any_used_part() {
    let css = ".menu .item{x:1}\n.nav > li.active{y:2}\n.card + .card{z:3}";
    assert_eq!(prune_text(css, &usage(&[".menu", ".nav", ".card"])), Rewrite::Unchanged);
}

#[test]
fn one_used_selector_keeps_the_whole_list() {
    let css = ".gone, .kept { color: red }";
    assert_eq!(prune_text(css, &usage(&[".kept"])), Rewrite::Unchanged);
}

#[test]
fn braces_in_strings_do_not_end_the_rule() {
    assert_eq!(
        pruned(".x::after{content:\"}\"}\n.y{a:1}", &[".y"]),
        "\n.y{a:1}"
    );
}

#[test]
fn media_block_keeps_its_used_children() {
    let css = "@media (max-width:600px){\n  .used{a:1}\n  .gone{b:2}\n}\n";
    let result = prune_text(css, &usage(&[".used"]));
    assert_eq!(result.removed(), 1);
    assert_eq!(
        result.text(),
        Some("@media (max-width:600px){\n  .used{a:1}\n  \n}\n")
    );
}

#[test]
fn media_block_with_no_used_children_is_removed() {
    let css = "p{x:1}\n@media print{.a{x:1}.b{y:2}}\nh1{z:3}";
    let result = prune_text(css, &UsageSet::default());
    assert_eq!(result.removed(), 3);
    assert_eq!(result.text(), Some("p{x:1}\n\nh1{z:3}"));
}

#[test]
fn empty_media_blocks_are_removed() {
    let css = ".a{x:1}\n@media print{}\n@media screen{ .e{} }\n.b{y:2}";
    let result = prune_text(css, &usage(&[".a"]));
    assert_eq!(result.removed(), 3);
    assert_eq!(result.text(), Some(".a{x:1}\n\n"));
}

#[test]
fn classes_in_inline_script_html_and_comments_are_kept() {
    let mut builder = UsageSetBuilder::new(["body"]);
    builder.add_markup(
        r#"<body><script>el.innerHTML = '<div class="popup_portfolio">hi</div>';</script>
<!-- <p class="legacy-banner"></p> --></body>"#,
    );
    let css = ".popup_portfolio{a:1}\n.legacy-banner{b:2}\n";
    assert_eq!(prune_text(css, &builder.build()), Rewrite::Unchanged);
}

#[test]
fn comments_and_at_rules_between_rules_survive() {
    let result = prune_text(MESSY_SHEET, &usage(&[".quote", ".nav"]));
    assert_eq!(result.removed(), 1);
    let text = result.into_text().expect("one rule removed");
    assert!(text.contains("/* .header { } is a comment */"));
    assert!(text.contains(".quote::before { content: \"}\"; }"));
    assert!(text.contains("@import url(\"base.css\");"));
    assert!(text.contains("@keyframes spin"));
    assert!(text.ends_with(".tail { color: blue /* unterminated"));
    assert!(!text.contains(".unused-mobile"));
}

#[test]
fn pruning_twice_changes_nothing() {
    let used = usage(&[".a", ".nav"]);
    let css = ".a{x:1}\n\n\n.b{y:2}\n@media screen{.nav{a:1}\n.c{b:2}}\n.d{c:3}";
    let once = prune_text(css, &used).into_text().expect("rules removed");
    assert_eq!(prune_text(&once, &used), Rewrite::Unchanged);
}

#[test]
fn usage_from_markup_and_scripts_drives_pruning() {
    let mut builder = UsageSetBuilder::new(["body"]);
    builder.add_markup(r#"<body><div id="main" class="wrapper dark"></div></body>"#);
    builder.add_script("document.getElementById('menu').classList.toggle('open');");
    let used = builder.build();

    let css = "body{m:0}\n#main{a:1}\n.wrapper.dark{b:2}\n#menu.open{c:3}\n.ghost{d:4}";
    let result = prune_text(css, &used);
    assert_eq!(result.removed(), 1);
    assert_eq!(
        result.text(),
        Some("body{m:0}\n#main{a:1}\n.wrapper.dark{b:2}\n#menu.open{c:3}\n")
    );
}

#[test]
fn prune_file_writes_backup_and_result() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("site.css");
    fs::write(&path, ".a{x:1}\n.b{y:2}\n").expect("write");

    let report = prune_file(&path, &usage(&[".a"]), &PruneOptions::default()).expect("prune");
    assert_eq!(report.removed, 1);
    assert_eq!(report.original_bytes, 16);
    assert_eq!(report.new_bytes, 9);

    let backup = report.backup.expect("backup written");
    assert_eq!(backup, dir.path().join("site.css.backup"));
    assert_eq!(fs::read_to_string(&backup).expect("read backup"), ".a{x:1}\n.b{y:2}\n");
    assert_eq!(fs::read_to_string(&path).expect("read result"), ".a{x:1}\n\n");
}

#[test]
fn dry_run_and_unchanged_files_are_left_alone() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("site.css");
    fs::write(&path, ".a{x:1}\n.b{y:2}\n").expect("write");

    let options = PruneOptions {
        dry_run: true,
        ..PruneOptions::default()
    };
    let report = prune_file(&path, &usage(&[".a"]), &options).expect("prune");
    assert!(report.changed());
    assert_eq!(report.backup, None);
    assert_eq!(fs::read_to_string(&path).expect("read"), ".a{x:1}\n.b{y:2}\n");

    let report =
        prune_file(&path, &usage(&[".a", ".b"]), &PruneOptions::default()).expect("prune");
    assert!(!report.changed());
    assert!(!dir.path().join("site.css.backup").exists());
}

#[test]
fn stylesheets_must_be_utf8() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.css");
    fs::write(&path, [b'.', b'a', 0xff, b'{', b'}']).expect("write");

    let err = prune_file(&path, &UsageSet::default(), &PruneOptions::default()).unwrap_err();
    assert!(matches!(err, PruneError::Read { .. }));
}

#[test]
fn run_prunes_configured_stylesheets() {
    let dir = tempfile::tempdir().expect("temp dir");
    let html = dir.path().join("index.html");
    let js = dir.path().join("main.js");
    let css = dir.path().join("style.css");
    fs::write(&html, r#"<html><body><div class="hero"></div></body></html>"#).expect("write");
    fs::write(&js, "$('.modal').addClass('open');").expect("write");
    fs::write(&css, "body{m:0}\n.hero{a:1}\n.unused{d:4}\n.modal.open{b:2}\n").expect("write");

    let config = Config {
        markup: vec![html.display().to_string()],
        scripts: vec![js.display().to_string()],
        stylesheets: vec![css.display().to_string()],
        verify: vec![".hero".to_string(), ".missing".to_string()],
        backup: false,
        ..Config::default()
    };
    let summary = prune::run(&config, &PruneOptions::from_config(&config)).expect("run");

    assert_eq!(
        summary.verified,
        vec![(".hero".to_string(), true), (".missing".to_string(), false)]
    );
    assert_eq!(summary.total_removed(), 1);
    assert_eq!(
        fs::read_to_string(&css).expect("read"),
        "body{m:0}\n.hero{a:1}\n\n.modal.open{b:2}\n"
    );
    assert!(!dir.path().join("style.css.backup").exists());
}

#[test]
fn run_without_stylesheets_fails() {
    let err = prune::run(&Config::default(), &PruneOptions::default()).unwrap_err();
    assert!(matches!(err, PruneError::NoStylesheets));
}
