mod captions;
mod client;
mod generator;
mod video_id;

pub use captions::YoutubeCaptionScraper;
pub use client::ScrapeClient;
pub use generator::PalmClient;
pub use video_id::extract_video_id;
