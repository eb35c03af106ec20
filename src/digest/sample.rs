// src/digest/sample.rs
use rand::seq::SliceRandom;
use rand::Rng;

use crate::digest::{FilteredPost, PostTemplate};
use crate::error::RenderError;

/// Shuffle all posts uniformly, keep the first `digest_size`.
pub fn sample<R: Rng + ?Sized>(
    mut posts: Vec<FilteredPost>,
    digest_size: usize,
    rng: &mut R,
) -> Vec<FilteredPost> {
    posts.shuffle(rng);
    posts.truncate(digest_size);
    posts
}

/// [`sample`], then render each survivor. Empty input gives an empty digest.
pub fn sample_and_render<R: Rng + ?Sized>(
    posts: Vec<FilteredPost>,
    digest_size: usize,
    template: &PostTemplate,
    rng: &mut R,
) -> Result<Vec<String>, RenderError> {
    sample(posts, digest_size, rng)
        .iter()
        .map(|p| template.render(p))
        .collect()
}
