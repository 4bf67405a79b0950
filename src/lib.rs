//! Study Buddy - backend for an AI study companion.
//!
//! Extracts text from uploaded notes and scans, turns it into quizzes and
//! flashcards with a generative model, and stores highlights, shared quiz
//! results, and restaurant invite codes.

pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod quiz;
pub mod repository;
pub mod schema;
pub mod server;
pub mod storage;
