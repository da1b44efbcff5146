//! Function signatures: `LF_PROCEDURE`, `LF_MFUNCTION` and argument lists.

use crate::{
    file::reader::BinaryReader,
    records::attributes::{CallingConvention, FunctionOptions},
    tpi::TypeIndex,
    Result,
};

/// `LF_PROCEDURE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureRecord {
    /// Return type
    pub return_type: TypeIndex,
    /// Raw [`CallingConvention`]
    pub calling_convention: u8,
    /// Signature attributes
    pub options: FunctionOptions,
    /// Number of parameters
    pub parameter_count: u16,
    /// `LF_ARGLIST` with the parameter types
    pub argument_list: TypeIndex,
}

impl ProcedureRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<ProcedureRecord> {
        Ok(ProcedureRecord {
            return_type: reader.read_le::<TypeIndex>()?,
            calling_convention: reader.read_le::<u8>()?,
            options: FunctionOptions::from_bits_truncate(reader.read_le::<u8>()?),
            parameter_count: reader.read_le::<u16>()?,
            argument_list: reader.read_le::<TypeIndex>()?,
        })
    }

    /// Calling convention, `None` for unknown values
    #[must_use]
    pub fn calling_convention(&self) -> Option<CallingConvention> {
        CallingConvention::from_repr(self.calling_convention)
    }
}

/// `LF_MFUNCTION`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFunctionRecord {
    /// Return type
    pub return_type: TypeIndex,
    /// Class the function is a member of
    pub class_type: TypeIndex,
    /// Type of `this`, [`TypeIndex::NONE`] for static members
    pub this_type: TypeIndex,
    /// Raw [`CallingConvention`]
    pub calling_convention: u8,
    /// Signature attributes
    pub options: FunctionOptions,
    /// Number of parameters
    pub parameter_count: u16,
    /// `LF_ARGLIST` with the parameter types
    pub argument_list: TypeIndex,
    /// Adjustment applied to `this` before the call
    pub this_pointer_adjustment: i32,
}

impl MemberFunctionRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<MemberFunctionRecord> {
        Ok(MemberFunctionRecord {
            return_type: reader.read_le::<TypeIndex>()?,
            class_type: reader.read_le::<TypeIndex>()?,
            this_type: reader.read_le::<TypeIndex>()?,
            calling_convention: reader.read_le::<u8>()?,
            options: FunctionOptions::from_bits_truncate(reader.read_le::<u8>()?),
            parameter_count: reader.read_le::<u16>()?,
            argument_list: reader.read_le::<TypeIndex>()?,
            this_pointer_adjustment: reader.read_le::<i32>()?,
        })
    }

    /// Calling convention, `None` for unknown values
    #[must_use]
    pub fn calling_convention(&self) -> Option<CallingConvention> {
        CallingConvention::from_repr(self.calling_convention)
    }

    /// Returns `true` for static member functions
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.this_type.is_none()
    }
}

/// `LF_ARGLIST` and `LF_SUBSTR_LIST`: a counted list of type indexes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentListRecord {
    /// The listed indexes
    pub arguments: Vec<TypeIndex>,
}

impl ArgumentListRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the count exceeds the available data.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<ArgumentListRecord> {
        let count = reader.read_le::<u32>()?;
        let arguments = reader
            .read_u32_array(count as usize)?
            .into_iter()
            .map(TypeIndex)
            .collect();
        Ok(ArgumentListRecord { arguments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::parser::Parser;

    #[test]
    fn crafted_procedure() {
        #[rustfmt::skip]
        let data = [
            0x03, 0x00, 0x00, 0x00, // void
            0x07,                   // NearStdCall
            0x00,
            0x02, 0x00,
            0x00, 0x10, 0x00, 0x00,
        ];
        let mut parser = Parser::new(&data);
        let record = ProcedureRecord::read(&mut parser).unwrap();
        assert!(!parser.has_more_data());
        assert_eq!(record.return_type, TypeIndex::VOID);
        assert_eq!(record.calling_convention(), Some(CallingConvention::NearStdCall));
        assert_eq!(record.options, FunctionOptions::empty());
        assert_eq!(record.parameter_count, 2);
        assert_eq!(record.argument_list, TypeIndex(0x1000));
    }

    #[test]
    fn crafted_member_function() {
        #[rustfmt::skip]
        let data = [
            0x74, 0x00, 0x00, 0x00,
            0x04, 0x10, 0x00, 0x00,
            0x05, 0x10, 0x00, 0x00,
            0x0b,                   // ThisCall
            0x02,                   // CONSTRUCTOR
            0x00, 0x00,
            0x06, 0x10, 0x00, 0x00,
            0xF8, 0xFF, 0xFF, 0xFF,
        ];
        let mut parser = Parser::new(&data);
        let record = MemberFunctionRecord::read(&mut parser).unwrap();
        assert!(!parser.has_more_data());
        assert_eq!(record.class_type, TypeIndex(0x1004));
        assert_eq!(record.this_type, TypeIndex(0x1005));
        assert_eq!(record.calling_convention(), Some(CallingConvention::ThisCall));
        assert!(record.options.contains(FunctionOptions::CONSTRUCTOR));
        assert_eq!(record.this_pointer_adjustment, -8);
        assert!(!record.is_static());
    }

    #[test]
    fn crafted_argument_list() {
        #[rustfmt::skip]
        let data = [
            0x02, 0x00, 0x00, 0x00,
            0x74, 0x00, 0x00, 0x00,
            0x03, 0x10, 0x00, 0x00,
        ];
        let record = ArgumentListRecord::read(&mut Parser::new(&data)).unwrap();
        assert_eq!(record.arguments, vec![TypeIndex(0x74), TypeIndex(0x1003)]);

        let truncated = [0x03, 0x00, 0x00, 0x00, 0x74, 0x00, 0x00, 0x00];
        assert!(ArgumentListRecord::read(&mut Parser::new(&truncated)).is_err());
    }
}
