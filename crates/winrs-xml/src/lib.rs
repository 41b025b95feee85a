use roxmltree::NodeType;

pub mod builder;
pub mod parser;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    #[error("Invalid XML: {0}")]
    ParserError(#[from] crate::parser::Error),

    #[error("Invalid tag: expected '{expected}', found '{found}'")]
    XmlInvalidTag { expected: String, found: String },

    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("Missing attribute '{attribute}' on element '{element}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Invalid node type: expected '{expected:?}', found {found:?}")]
    InvalidNodeType { expected: NodeType, found: NodeType },

    #[error("{0}")]
    GenericError(String),
}
