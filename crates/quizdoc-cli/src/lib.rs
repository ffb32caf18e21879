//! quizdoc CLI - Command-line interface library
//!
//! - Convert: turn exam DOCX files into question-bank XML
//! - Inspect: show how a document is segmented
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert every DOCX in a folder
//! quizdoc convert "de-thi/*.docx" --output xml/
//!
//! # Write diagnostics as JSON next to the XML
//! quizdoc convert de1.docx --format json
//!
//! # Show groups, questions and shared materials
//! quizdoc inspect de1.docx
//! ```

pub mod app;

pub use app::{
    convert_command, convert_file, describe_segmentation, expand_inputs, inspect_command,
    load_settings, run_cli, BatchSummary, OutputFormat,
};
