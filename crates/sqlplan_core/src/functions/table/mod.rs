use std::any::Any;
use std::fmt::{self, Debug};

use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use sqlplan_error::Result;

use crate::arrays::datatype::DataType;
use crate::arrays::field::Field;
use crate::arrays::scalar::ScalarValue;

/// How a table argument consumes its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableArgumentSemantics {
    /// Each input row is processed independently. Partitioning does not apply
    /// and an empty input always produces an empty output.
    Row,
    /// The input is processed as a relation, optionally split into partitions.
    Set,
}

/// Declaration of a scalar argument in a function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarArgumentSpec {
    pub name: String,
    pub datatype: DataType,
    /// Default value. An argument without a default is required.
    pub default: Option<ScalarValue>,
}

/// Declaration of a descriptor argument in a function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorArgumentSpec {
    pub name: String,
    pub default: Option<DescriptorValue>,
}

/// Declaration of a table argument in a function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct TableArgumentSpec {
    pub name: String,
    pub semantics: TableArgumentSemantics,
    /// If true, an empty input on this argument makes the whole function
    /// output empty. Row semantics arguments always prune.
    pub prune_when_empty: bool,
    /// If true, all input columns are forwarded alongside the proper outputs.
    pub pass_through_columns: bool,
    /// Ordinals of input columns the function reads.
    pub required_columns: Vec<usize>,
}

impl TableArgumentSpec {
    pub fn prunes_when_empty(&self) -> bool {
        self.prune_when_empty || self.semantics == TableArgumentSemantics::Row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentSpec {
    Scalar(ScalarArgumentSpec),
    Descriptor(DescriptorArgumentSpec),
    Table(TableArgumentSpec),
}

impl ArgumentSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(spec) => &spec.name,
            Self::Descriptor(spec) => &spec.name,
            Self::Table(spec) => &spec.name,
        }
    }
}

/// A single field in a descriptor.
///
/// The type is optional, descriptors may carry names only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DescriptorField {
    pub name: String,
    pub datatype: Option<DataType>,
}

/// A list of named, optionally typed fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    pub fields: Vec<DescriptorField>,
}

/// Value bound to a descriptor argument.
///
/// A null descriptor is distinct from a descriptor with no fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DescriptorValue {
    Descriptor(Descriptor),
    Null,
}

impl DescriptorValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, DescriptorValue::Null)
    }
}

impl fmt::Display for DescriptorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Descriptor(desc) => {
                write!(f, "DESCRIPTOR(")?;
                for (idx, field) in desc.fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field.name)?;
                    if let Some(datatype) = field.datatype {
                        write!(f, " {datatype}")?;
                    }
                }
                write!(f, ")")
            }
        }
    }
}

/// Opaque state a table function carries from analysis into the plan.
///
/// Handles survive optimization unchanged. Connector-provided hooks may
/// inspect them during pushdown, see [`TableFunctionApplyHook`].
pub trait TableFunctionHandle: Debug + DynClone + Send + Sync {
    fn name(&self) -> &str;
    fn as_any(&self) -> &dyn Any;
}

dyn_clone::clone_trait_object!(TableFunctionHandle);

impl PartialEq for dyn TableFunctionHandle + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl PartialEq<dyn TableFunctionHandle> for Box<dyn TableFunctionHandle + '_> {
    fn eq(&self, other: &dyn TableFunctionHandle) -> bool {
        self.as_ref() == other
    }
}

/// Signature of a table function as registered in a catalog.
#[derive(Debug, Clone)]
pub struct TableFunctionSignature {
    pub name: String,
    pub arguments: Vec<ArgumentSpec>,
    /// Columns the function itself produces, before any pass-through columns.
    pub proper_outputs: Vec<Field>,
    /// Handle attached to every invocation of this function.
    pub handle: Option<Box<dyn TableFunctionHandle>>,
}

impl TableFunctionSignature {
    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments
            .iter()
            .find(|arg| arg.name().eq_ignore_ascii_case(name))
    }

    pub fn table_arguments(&self) -> impl Iterator<Item = &TableArgumentSpec> {
        self.arguments.iter().filter_map(|arg| match arg {
            ArgumentSpec::Table(spec) => Some(spec),
            _ => None,
        })
    }
}

/// Result of scan pushdown for a table function with no table arguments.
///
/// The function's output is replaced with a direct scan of `handle`, with
/// `column_mapping[i]` giving the scan column that backs output column `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanApplication {
    pub handle: ScanHandle,
    pub column_mapping: Vec<usize>,
}

/// Source description for a pushed-down scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanHandle {
    pub name: String,
    pub column_names: Vec<String>,
    pub column_types: Vec<DataType>,
}

/// Result of asking a hook to absorb a table function.
pub trait AppliedTableFunction: Debug {
    fn as_any(&self) -> &dyn Any;
}

impl AppliedTableFunction for ScanApplication {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Hook provided by a data source to absorb table function invocations into
/// scans.
///
/// Returning `Ok(None)` leaves the plan unchanged. Returning `Some` replaces
/// the function node, so the hook must only do so when the scan produces
/// exactly the rows the function would have.
pub trait TableFunctionApplyHook: Debug + Send + Sync {
    fn apply_table_function(
        &self,
        handle: &dyn TableFunctionHandle,
    ) -> Result<Option<Box<dyn AppliedTableFunction>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct TestHandle(&'static str);

    impl TableFunctionHandle for TestHandle {
        fn name(&self) -> &str {
            self.0
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn handle_eq_by_name() {
        let a: Box<dyn TableFunctionHandle> = Box::new(TestHandle("system_table"));
        let b: Box<dyn TableFunctionHandle> = Box::new(TestHandle("system_table"));
        let c: Box<dyn TableFunctionHandle> = Box::new(TestHandle("other"));

        assert_eq!(a.as_ref(), b.as_ref());
        assert_ne!(a.as_ref(), c.as_ref());
    }

    #[test]
    fn row_semantics_always_prunes() {
        let spec = TableArgumentSpec {
            name: "input".to_string(),
            semantics: TableArgumentSemantics::Row,
            prune_when_empty: false,
            pass_through_columns: true,
            required_columns: Vec::new(),
        };
        assert!(spec.prunes_when_empty());
    }

    #[test]
    fn descriptor_display() {
        let value = DescriptorValue::Descriptor(Descriptor {
            fields: vec![
                DescriptorField {
                    name: "bigint_field".to_string(),
                    datatype: Some(DataType::Int64),
                },
                DescriptorField {
                    name: "untyped".to_string(),
                    datatype: None,
                },
            ],
        });
        assert_eq!(
            "DESCRIPTOR(bigint_field Int64, untyped)",
            value.to_string()
        );
    }
}
