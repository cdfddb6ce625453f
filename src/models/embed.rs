use std::path::PathBuf;
use crate::service::image::LoadedImage;

pub struct EmbedInput<'a> {
    pub image: &'a LoadedImage,
    pub svg_path: PathBuf,
}
