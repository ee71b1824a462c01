//! Built-in recipes.

mod otto_js;

use refork_pipeline::RecipeSource;

pub use self::otto_js::OttoToJs;

/// Recipe run when none is named on the command line.
pub const DEFAULT_RECIPE: &str = "otto-js";

static BUILTIN: &[(&str, &(dyn RecipeSource + Sync))] = &[(DEFAULT_RECIPE, &OttoToJs)];

/// Looks up a built-in recipe by name.
#[must_use]
pub fn builtin(name: &str) -> Option<&'static dyn RecipeSource> {
    BUILTIN
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|&(_, source)| source as &'static dyn RecipeSource)
}

/// Names of the built-in recipes.
#[must_use]
pub fn names() -> Vec<&'static str> {
    BUILTIN.iter().map(|(name, _)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recipe_is_registered() {
        let source = builtin(DEFAULT_RECIPE).expect("registered");
        assert_eq!(source.upstream_import_path(), "github.com/robertkrimen/otto");
        assert_eq!(names(), vec!["otto-js"]);
    }

    #[test]
    fn unknown_names_are_not_found() {
        assert!(builtin("lua-js").is_none());
    }
}
