//! Structural matching of rule targets against parsed declarations.

use instmatch_core::RuleTarget;

use crate::extractor::{DeclKind, Declaration, SourceFile};

/// Returns `true` if `decl` is the declaration `target` points at.
///
/// File targets never match a declaration; they are satisfied by the
/// package clause alone.
#[must_use]
pub fn matches_declaration(decl: &Declaration, target: &RuleTarget) -> bool {
    match target {
        RuleTarget::File { .. } => false,
        RuleTarget::Struct { type_name } => decl.kind == DeclKind::Type && decl.name == *type_name,
        RuleTarget::Func {
            function,
            receiver_type,
        } => {
            decl.kind == DeclKind::Func
                && decl.name == *function
                && decl.receiver == *receiver_type
        }
    }
}

/// First declaration in `file`, in source order, that `target` points at.
#[must_use]
pub fn find_match<'a>(file: &'a SourceFile, target: &RuleTarget) -> Option<&'a Declaration> {
    file.declarations
        .iter()
        .find(|decl| matches_declaration(decl, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(function: &str, receiver_type: &str) -> RuleTarget {
        RuleTarget::Func {
            function: function.into(),
            receiver_type: receiver_type.into(),
        }
    }

    fn sql_file() -> SourceFile {
        SourceFile {
            package: "sql".into(),
            declarations: vec![
                Declaration::type_decl(10, "DB"),
                Declaration::func_decl(20, "Open", ""),
                Declaration::func_decl(30, "Query", "*DB"),
                Declaration::func_decl(40, "Query", "*Tx"),
                Declaration::func_decl(50, "Close", "DB"),
            ],
        }
    }

    #[test]
    fn free_function() {
        let file = sql_file();
        assert_eq!(find_match(&file, &func("Open", "")).map(|d| d.line), Some(20));
    }

    #[test]
    fn receiver_must_match_exactly() {
        let file = sql_file();
        assert_eq!(find_match(&file, &func("Query", "*Tx")).map(|d| d.line), Some(40));
        assert!(find_match(&file, &func("Query", "")).is_none());
        assert!(find_match(&file, &func("Close", "*DB")).is_none());
        assert!(find_match(&file, &func("Open", "*DB")).is_none());
    }

    #[test]
    fn struct_matches_type_only() {
        let file = sql_file();
        let target = RuleTarget::Struct {
            type_name: "DB".into(),
        };
        assert_eq!(find_match(&file, &target).map(|d| d.line), Some(10));

        let target = RuleTarget::Struct {
            type_name: "Open".into(),
        };
        assert!(find_match(&file, &target).is_none());
    }

    #[test]
    fn first_declaration_wins() {
        let file = SourceFile {
            package: "a".into(),
            declarations: vec![
                Declaration::func_decl(3, "init", ""),
                Declaration::func_decl(9, "init", ""),
            ],
        };
        assert_eq!(find_match(&file, &func("init", "")).map(|d| d.line), Some(3));
    }

    #[test]
    fn file_target_never_matches_declarations() {
        let target = RuleTarget::File {
            file_name: "hook.go".into(),
        };
        assert!(find_match(&sql_file(), &target).is_none());
    }
}
