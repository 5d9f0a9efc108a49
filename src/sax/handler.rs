//! Consumer Interface
//!
//! A consumer implements [`ContentHandler`] and receives the replayed
//! document as push events. Every callback has a no-op default, so a
//! consumer only overrides what it cares about. Returning an error from any
//! callback aborts the replay.
//!
//! Fatal decode errors are also reported to an [`ErrorHandler`] before the
//! replay returns them.

use log::error;

use super::attributes::Attributes;
use crate::buffer::Opaque;
use crate::error::{Error, HandlerError};

/// Result of a consumer callback
pub type HandlerResult = Result<(), HandlerError>;

/// Receiver of replayed document events
pub trait ContentHandler {
    fn start_document(&mut self) -> HandlerResult {
        Ok(())
    }

    fn end_document(&mut self) -> HandlerResult {
        Ok(())
    }

    /// Element start with its attributes
    ///
    /// `attributes` is only valid for the duration of the call.
    fn start_element(
        &mut self,
        _uri: &str,
        _local_name: &str,
        _qname: &str,
        _attributes: &Attributes,
    ) -> HandlerResult {
        Ok(())
    }

    fn end_element(&mut self, _uri: &str, _local_name: &str, _qname: &str) -> HandlerResult {
        Ok(())
    }

    fn characters(&mut self, _text: &str) -> HandlerResult {
        Ok(())
    }

    fn comment(&mut self, _text: &str) -> HandlerResult {
        Ok(())
    }

    fn processing_instruction(&mut self, _target: &str, _data: &str) -> HandlerResult {
        Ok(())
    }

    /// A prefix binding comes into scope (empty `uri` undeclares it)
    fn start_prefix_mapping(&mut self, _prefix: &str, _uri: &str) -> HandlerResult {
        Ok(())
    }

    fn end_prefix_mapping(&mut self, _prefix: &str) -> HandlerResult {
        Ok(())
    }

    /// Non-textual element content stored as an opaque object
    fn object_content(&mut self, _value: &Opaque) -> HandlerResult {
        Ok(())
    }
}

impl<H: ContentHandler + ?Sized> ContentHandler for &mut H {
    fn start_document(&mut self) -> HandlerResult {
        (**self).start_document()
    }

    fn end_document(&mut self) -> HandlerResult {
        (**self).end_document()
    }

    fn start_element(
        &mut self,
        uri: &str,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        (**self).start_element(uri, local_name, qname, attributes)
    }

    fn end_element(&mut self, uri: &str, local_name: &str, qname: &str) -> HandlerResult {
        (**self).end_element(uri, local_name, qname)
    }

    fn characters(&mut self, text: &str) -> HandlerResult {
        (**self).characters(text)
    }

    fn comment(&mut self, text: &str) -> HandlerResult {
        (**self).comment(text)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> HandlerResult {
        (**self).processing_instruction(target, data)
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> HandlerResult {
        (**self).start_prefix_mapping(prefix, uri)
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> HandlerResult {
        (**self).end_prefix_mapping(prefix)
    }

    fn object_content(&mut self, value: &Opaque) -> HandlerResult {
        (**self).object_content(value)
    }
}

/// Receiver of fatal decode errors
pub trait ErrorHandler: Send {
    /// Called once, before the failing replay returns `error`
    fn fatal_error(&mut self, error: &Error);
}

/// Error handler that logs fatal errors
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn fatal_error(&mut self, err: &Error) {
        error!("fatal error while replaying buffer: {err}");
    }
}

/// Consumer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHandler;

impl ContentHandler for DefaultHandler {}

impl ErrorHandler for DefaultHandler {
    fn fatal_error(&mut self, _error: &Error) {}
}
