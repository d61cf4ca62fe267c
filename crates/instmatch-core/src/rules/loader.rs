//! DTO → domain model conversion with validation.

use super::dto::RuleDto;
use super::model::{Rule, RuleBase, RuleTarget};

/// Errors during DTO → domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The record has no import path.
    #[error("rules[{index}]: `importPath` is required")]
    MissingImportPath {
        /// Position of the record in its source.
        index: usize,
    },

    /// None of `fileName`, `structType`, `function` is set.
    #[error("rules[{index}] ({import_path}): one of `fileName`, `structType` or `function` must be set")]
    MissingTarget {
        /// Position of the record in its source.
        index: usize,
        /// Import path of the offending record.
        import_path: String,
    },

    /// More than one target field is set.
    #[error("rules[{index}] ({import_path}): only one target may be set, found {}", .targets.join(", "))]
    AmbiguousTarget {
        /// Position of the record in its source.
        index: usize,
        /// Import path of the offending record.
        import_path: String,
        /// The target fields that were set.
        targets: Vec<&'static str>,
    },

    /// `receiverType` without `function`.
    #[error("rules[{index}] ({import_path}): `receiverType` requires `function`")]
    DanglingReceiver {
        /// Position of the record in its source.
        index: usize,
        /// Import path of the offending record.
        import_path: String,
    },
}

/// Converts rule DTOs into validated rules, preserving their order.
///
/// # Errors
///
/// Returns the first malformed record.
pub fn load(dtos: Vec<RuleDto>) -> Result<Vec<Rule>, LoadError> {
    dtos.into_iter()
        .enumerate()
        .map(|(i, dto)| convert_rule(dto, i))
        .collect()
}

fn convert_rule(dto: RuleDto, index: usize) -> Result<Rule, LoadError> {
    if dto.import_path.is_empty() {
        return Err(LoadError::MissingImportPath { index });
    }

    let set: Vec<&'static str> = [
        ("fileName", &dto.file_name),
        ("structType", &dto.struct_type),
        ("function", &dto.function),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(name, _)| name)
    .collect();

    if !dto.receiver_type.is_empty() && !set.contains(&"function") {
        return Err(LoadError::DanglingReceiver {
            index,
            import_path: dto.import_path,
        });
    }

    let target = match set.as_slice() {
        [] => {
            return Err(LoadError::MissingTarget {
                index,
                import_path: dto.import_path,
            })
        }
        ["fileName"] => RuleTarget::File {
            file_name: dto.file_name,
        },
        ["structType"] => RuleTarget::Struct {
            type_name: dto.struct_type,
        },
        ["function"] => RuleTarget::Func {
            function: dto.function,
            receiver_type: dto.receiver_type,
        },
        _ => {
            return Err(LoadError::AmbiguousTarget {
                index,
                import_path: dto.import_path,
                targets: set,
            })
        }
    };

    let base = RuleBase {
        import_path: dto.import_path,
        version: dto.version,
        go_version: dto.go_version,
    };

    Ok(Rule::new(base, target).with_payload(dto.payload))
}
