//! # Todo Service ライブラリ
//!
//! Todo Service の設定・ユースケース・ハンドラとルーター構築を公開する。
//! バイナリ（`main.rs`）と統合テストの両方から利用する。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
