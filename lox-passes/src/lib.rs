//! Static passes run over the AST before interpretation.

pub mod resolve;
