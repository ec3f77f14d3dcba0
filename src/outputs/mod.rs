//! Output generation for the selected articles.
//!
//! # Submodules
//!
//! - [`text`]: Renders the clipping list that users paste into reports
//! - [`json`]: Writes a machine-readable snapshot of the ranked results
//!
//! # Clipping Format
//!
//! ```text
//! ■ 육군, 동계 훈련 돌입 (연합뉴스)
//! https://n.news.naver.com/mnews/article/001/0014000000
//!
//! ■ 국방부 정례 브리핑 (KBS)
//! https://news.kbs.co.kr/news/view.do?ncd=1
//! ```

pub mod json;
pub mod text;
