//! Forks `github.com/robertkrimen/otto` as the Go package `js`.
//!
//! The step list is order-sensitive. Receiver renames run before the generic
//! `self -> o` sweep so scoped receivers get their specific names first, the
//! `otto -> vm` variable passes run after every import path has been
//! rewritten, and the license shield (`OTTO`) is restored only once no rule
//! that could touch the upstream name remains.

use refork_pipeline::{CommandSpec, PipelineError, Recipe, RecipeContext, RecipeSource, Step};
use refork_rewrite::{
    DocTemplate, FileGlob, LicenseTemplate, Matcher, PatchSet, PruneSpec, RenameSpec,
    RewriteError, RewriteRule, Scope, Shield, TreePath,
};

const UPSTREAM: &str = "github.com/robertkrimen/otto";
const LICENSE: &str = include_str!("license.txt");
const DOC_TEMPLATE: &str = include_str!("doc.go.tmpl");
const STDOUT_PATCH: &str = include_str!("stdout.patch");
const TERST_IMPORT: &str = ". \"github.com/cznic/js/terst\"";

const PRUNED: &[&str] = &[
    "inline",
    "Makefile",
    "otto",
    "README.*",
    "registry/README.*",
    "underscore/README.*",
    "DESIGN.*",
    "underscore/testify",
];

/// Recipe source for the `otto -> js` fork.
#[derive(Debug, Default, Clone, Copy)]
pub struct OttoToJs;

impl RecipeSource for OttoToJs {
    fn upstream_import_path(&self) -> &str {
        UPSTREAM
    }

    fn recipe(&self, context: &RecipeContext) -> Result<Recipe, PipelineError> {
        let top_level = FileGlob::new("*.go")?;
        let every = FileGlob::new("**/*.go")?;
        let nested = FileGlob::new("*/**/*.go")?;
        let js_go = FileGlob::new("js.go")?;
        let value_go = FileGlob::new("value.go")?;
        let import_path = context.import_path();

        let license = LicenseTemplate::new(LICENSE).with_shield(Shield::new("OTTO", "otto"));

        Ok(Recipe::new("otto-js", license)
            .verify_before(CommandSpec::parse("go test -i")?)
            .verify_before(CommandSpec::parse("go test")?)
            .step(Step::Command(CommandSpec::parse("go fmt")?))
            .rule(
                substitute("package clause", &top_level, pattern("^package otto$")?, "package js")
                    .first_per_line(),
            )
            .rule(
                substitute("top-level import path", &top_level, literal(UPSTREAM)?, import_path)
                    .first_per_line(),
            )
            .step(Step::Rename(RenameSpec::new(
                FileGlob::new("*otto*.go")?,
                "otto",
                "js",
            )?))
            .step(Step::Prune(PruneSpec::new(FileGlob::any(PRUNED)?)))
            .rule(
                RewriteRule::delete_lines("upstream package comment", js_go.clone())
                    .within(Scope::through(r"\*/")?),
            )
            .rule(substitute("Otto type", &top_level, pattern(r"Otto\b")?, "Runtime"))
            .rule(substitute("Otto identifiers", &every, literal("Otto")?, "js").first_per_line())
            .rule(
                substitute(
                    "runtime in example comments",
                    &top_level,
                    pattern(r"(//.*:= )Runtime\.")?,
                    "${1}runtime.",
                )
                .first_per_line(),
            )
            .rule(
                substitute(
                    "FunctionCall receivers",
                    &FileGlob::new("type_function.go")?,
                    pattern("self")?,
                    "f",
                )
                .within(Scope::from_line(r"^func \(self FunctionCall\)")?),
            )
            .rule(
                substitute("Object receivers", &js_go, pattern("self")?, "o")
                    .within(Scope::from_line(r"^func \(self Object\)")?),
            )
            .rule(
                substitute("Runtime receivers", &js_go, pattern("self")?, "r")
                    .within(Scope::between(r"^func \(self Runtime\)", "^type Object")?),
            )
            .rule(substitute("Value receivers", &value_go, pattern(r"\bself\b")?, "value"))
            .rule(substitute(
                "JavaScript doc links",
                &FileGlob::any(["js.go", "value.go"])?,
                literal("otto/JavaScript")?,
                "js/JavaScript",
            ))
            .rule(substitute("Value doc links", &value_go, literal("otto.Value")?, "js.Value"))
            .rule(
                substitute(
                    "nested import paths",
                    &nested,
                    literal(format!("\"{UPSTREAM}"))?,
                    format!("\"{import_path}"),
                )
                .first_per_line(),
            )
            .rule(otto_variables("otto variables, first pass", &every)?)
            .rule(otto_variables("otto variables, second pass", &every)?)
            .rule(
                substitute("local terst import", &every, literal(". \"./terst\"")?, TERST_IMPORT)
                    .first_per_line(),
            )
            .rule(
                substitute(
                    "upstream terst import",
                    &every,
                    literal(". \"github.com/robertkrimen/terst\"")?,
                    TERST_IMPORT,
                )
                .first_per_line(),
            )
            .rule(substitute("self receivers", &every, pattern(r"\bself\b")?, "o"))
            .rule(substitute(
                "numbered self receivers",
                &every,
                pattern(r"\bself([0-9])\b")?,
                "o${1}",
            ))
            .rule(substitute(
                "self-contained",
                &every,
                pattern(r"\bo-contained")?,
                "self-contained",
            ))
            .rule(restore_shield("restore shield in Go files", &every)?)
            .rule(restore_shield("restore shield in LICENSE", &FileGlob::new("**/LICENSE")?)?)
            .step(Step::Command(CommandSpec::parse("go fmt")?))
            .step(Step::Patch(PatchSet::new(STDOUT_PATCH)))
            .with_doc(DocTemplate::new(TreePath::new("doc.go")?, DOC_TEMPLATE))
            .verify_after(CommandSpec::parse("go test")?))
    }
}

fn substitute(
    name: &str,
    files: &FileGlob,
    matcher: Matcher,
    replacement: impl Into<String>,
) -> RewriteRule {
    RewriteRule::substitute(name, files.clone(), matcher, replacement)
}

fn pattern(source: &str) -> Result<Matcher, RewriteError> {
    Matcher::pattern(source)
}

fn literal(text: impl Into<String>) -> Result<Matcher, RewriteError> {
    Matcher::literal(text)
}

/// Renames local `otto` variables; one pass handles one occurrence per line.
fn otto_variables(name: &str, files: &FileGlob) -> Result<RewriteRule, RewriteError> {
    Ok(substitute(name, files, pattern(r"([^/].*)otto")?, "${1}vm").first_per_line())
}

fn restore_shield(name: &str, files: &FileGlob) -> Result<RewriteRule, RewriteError> {
    Ok(substitute(name, files, literal("OTTO")?, "otto").first_per_line())
}
