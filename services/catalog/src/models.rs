//! Catalog models for request and response payloads

pub mod movie;

pub use movie::{
    Counter, MovieBriefResponse, MovieDraft, MovieFilter, MovieListResponse, MovieQuery,
    MovieRecord, MovieRequest, MovieResponse, PageRequest,
};
