use crate::commands::{
    error::{CommandResult, InternalError},
    value::Value,
};
use std::any::Any;

#[derive(Debug, Clone, Default)]
pub struct ArgumentSet {
    args: Vec<Value>,
}

impl ArgumentSet {
    pub(super) fn new(args: Vec<Value>) -> Self {
        Self { args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.args.iter()
    }

    pub fn get(&self, index: usize) -> CommandResult<&Value> {
        self.args
            .get(index)
            .ok_or_else(|| InternalError::MissingArgument { index }.into())
    }

    fn type_error(&self, index: usize, value: &Value, expected: &str) -> InternalError {
        InternalError::WrongArgumentType {
            index,
            expected: expected.to_string(),
            found: value.type_name().to_string(),
        }
    }

    pub fn is_null(&self, index: usize) -> CommandResult<bool> {
        Ok(self.get(index)?.is_null())
    }

    pub fn get_string(&self, index: usize) -> CommandResult<String> {
        let value = self.get(index)?;
        value
            .as_string()
            .map(str::to_string)
            .ok_or_else(|| self.type_error(index, value, "String").into())
    }

    pub fn get_integer(&self, index: usize) -> CommandResult<i32> {
        let value = self.get(index)?;
        value
            .as_integer()
            .ok_or_else(|| self.type_error(index, value, "Integer").into())
    }

    pub fn get_double(&self, index: usize) -> CommandResult<f64> {
        let value = self.get(index)?;
        value
            .as_double()
            .ok_or_else(|| self.type_error(index, value, "Double").into())
    }

    pub fn get_opaque<T: Any>(&self, index: usize) -> CommandResult<&T> {
        let value = self.get(index)?;
        value
            .as_opaque::<T>()
            .ok_or_else(|| self.type_error(index, value, std::any::type_name::<T>()).into())
    }
}
