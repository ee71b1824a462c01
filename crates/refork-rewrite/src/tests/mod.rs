//! Crate-level integration and BDD tests.

use tempfile::TempDir;

use crate::{
    FileGlob, Matcher, RenameSpec, RewriteRule, RuleEngine, Scope, SourceTree, TreePath,
};


const VALUE_GO: &str = concat!(
    "package otto\n",
    "\n",
    "type Value struct{ self int }\n",
    "\n",
    "func (self Value) IsNull() bool { return self.kind == valueNull }\n",
    "func (self Object) Get(name string) Value { return self.object.get(name) }\n",
);

fn recipe() -> Vec<RewriteRule> {
    let go = || FileGlob::new("**/*.go").expect("glob");
    vec![
        RewriteRule::substitute(
            "package",
            go(),
            Matcher::pattern("^package otto$").expect("pattern"),
            "package js",
        ),
        RewriteRule::substitute(
            "object receiver",
            go(),
            Matcher::pattern(r"\bself\b").expect("pattern"),
            "o",
        )
        .within(Scope::from_line(r"^func \(self Object\)").expect("scope")),
        RewriteRule::substitute(
            "value receiver",
            go(),
            Matcher::pattern(r"\bself\b").expect("pattern"),
            "value",
        ),
    ]
}

fn seeded_tree() -> (TempDir, SourceTree) {
    let dir = TempDir::new().expect("temp dir");
    let tree = SourceTree::new(dir.path());
    tree.write(&TreePath::new("value.go").expect("path"), VALUE_GO.as_bytes())
        .expect("seed");
    (dir, tree)
}

fn snapshot(tree: &SourceTree) -> Vec<(String, Vec<u8>)> {
    tree.files()
        .expect("list")
        .into_iter()
        .map(|path| {
            let content = tree.read(&path).expect("read");
            (path.as_str().to_owned(), content)
        })
        .collect()
}

#[test]
fn identical_inputs_produce_identical_trees() {
    let (_first_dir, first) = seeded_tree();
    let (_second_dir, second) = seeded_tree();
    let rules = recipe();

    RuleEngine::new(&first).apply_all(&rules).expect("first run");
    RuleEngine::new(&second).apply_all(&rules).expect("second run");

    assert_eq!(snapshot(&first), snapshot(&second));
}

#[test]
fn scoped_rule_leaves_lines_before_the_scope_alone() {
    let (_dir, tree) = seeded_tree();
    let rules = recipe();
    RuleEngine::new(&tree).apply_all(&rules).expect("apply");

    let content = String::from_utf8(
        tree.read(&TreePath::new("value.go").expect("path"))
            .expect("read"),
    )
    .expect("utf8");
    assert_eq!(
        content,
        concat!(
            "package js\n",
            "\n",
            "type Value struct{ value int }\n",
            "\n",
            "func (value Value) IsNull() bool { return value.kind == valueNull }\n",
            "func (o Object) Get(name string) Value { return o.object.get(name) }\n",
        )
    );
}

#[test]
fn renamed_files_keep_rewritten_content() {
    let (_dir, tree) = seeded_tree();
    tree.write(&TreePath::new("otto_test.go").expect("path"), b"package otto\n")
        .expect("seed");
    RuleEngine::new(&tree).apply_all(&recipe()).expect("apply");
    RenameSpec::new(FileGlob::new("*otto*.go").expect("glob"), "otto", "js")
        .expect("spec")
        .apply(&tree)
        .expect("rename");

    let renamed = tree
        .read(&TreePath::new("js_test.go").expect("path"))
        .expect("read");
    assert_eq!(renamed, b"package js\n");
}
