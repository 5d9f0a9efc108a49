//! Child State Table
//!
//! Inside an element's children loop several tag words collapse to the same
//! handling, and attribute/document words are illegal. The table maps every
//! raw tag word to the state the loop dispatches on, so the loop needs a
//! single indexed load instead of decoding flags.

use super::tag::*;

/// Dispatch state for one child of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildState {
    End,
    ElementUriLocalNameQualifiedName,
    ElementPrefixUriLocalName,
    ElementUriLocalName,
    ElementLocalName,
    TextAsCharArray,
    TextAsCharArrayCopy,
    TextAsString,
    TextAsObject,
    CommentAsCharArray,
    CommentAsCharArrayCopy,
    CommentAsString,
    ProcessingInstruction,
    Illegal,
}

const TABLE_SIZE: usize = 256;

const fn build_table() -> [ChildState; TABLE_SIZE] {
    let mut table = [ChildState::Illegal; TABLE_SIZE];
    table[T_END as usize] = ChildState::End;
    table[T_ELEMENT_U_LN_QN as usize] = ChildState::ElementUriLocalNameQualifiedName;
    table[T_ELEMENT_P_U_LN as usize] = ChildState::ElementPrefixUriLocalName;
    table[T_ELEMENT_U_LN as usize] = ChildState::ElementUriLocalName;
    table[T_ELEMENT_LN as usize] = ChildState::ElementLocalName;
    table[T_TEXT_AS_CHAR_ARRAY as usize] = ChildState::TextAsCharArray;
    table[T_TEXT_AS_CHAR_ARRAY_COPY as usize] = ChildState::TextAsCharArrayCopy;
    table[T_TEXT_AS_STRING as usize] = ChildState::TextAsString;
    table[T_TEXT_AS_OBJECT as usize] = ChildState::TextAsObject;
    table[T_COMMENT_AS_CHAR_ARRAY as usize] = ChildState::CommentAsCharArray;
    table[T_COMMENT_AS_CHAR_ARRAY_COPY as usize] = ChildState::CommentAsCharArrayCopy;
    table[T_COMMENT_AS_STRING as usize] = ChildState::CommentAsString;
    table[T_PROCESSING_INSTRUCTION as usize] = ChildState::ProcessingInstruction;
    table
}

static STATE_TABLE: [ChildState; TABLE_SIZE] = build_table();

/// State for a tag word read inside an element
#[inline]
pub fn child_state(word: u32) -> ChildState {
    STATE_TABLE
        .get(word as usize)
        .copied()
        .unwrap_or(ChildState::Illegal)
}
