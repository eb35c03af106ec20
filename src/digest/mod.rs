// src/digest/mod.rs
pub mod filter;
pub mod sample;
pub mod template;

pub use filter::{filter, FilteredPost, TimeWindow};
pub use sample::{sample, sample_and_render};
pub use template::PostTemplate;

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use rand::Rng;

use crate::config::RelayConfig;
use crate::error::{PipelineError, RenderError};
use crate::source::{collect, reddit::normalize_topic, SourceClient};

/// Admissible posts for one topic, before sampling.
#[derive(Debug, Clone)]
pub struct Gathered {
    pub topic: String,
    pub pages: usize,
    pub collected: usize,
    pub posts: Vec<FilteredPost>,
}

/// Result of one successful invocation.
#[derive(Debug, Clone)]
pub struct Digest {
    pub topic: String,
    pub pages: usize,
    pub collected: usize,
    pub admissible: usize,
    pub posts: Vec<FilteredPost>,
    pub entries: Vec<String>,
}

/// fetch → accumulate → filter → sample → render.
///
/// Holds only read-only collaborators; every call builds its own working set.
#[derive(Clone)]
pub struct DigestPipeline {
    source: Arc<dyn SourceClient>,
    config: Arc<RelayConfig>,
    template: PostTemplate,
}

impl DigestPipeline {
    pub fn new(source: Arc<dyn SourceClient>, config: RelayConfig) -> Result<Self, RenderError> {
        let template = PostTemplate::new(&config.template)?.with_text_limit(config.max_text_chars);
        Ok(Self {
            source,
            config: Arc::new(config),
            template,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Read the listing for `topic` and keep the admissible posts.
    pub async fn gather(&self, topic: &str, now: DateTime<Utc>) -> Result<Gathered, PipelineError> {
        let topic =
            normalize_topic(topic).ok_or_else(|| PipelineError::InvalidTopic(topic.to_string()))?;

        let acc = collect(self.source.as_ref(), &topic, self.config.max_pages).await?;

        let window = self.config.window_at(now);
        let posts = filter(
            &acc.items,
            self.config.min_score,
            window,
            &self.config.site_origin,
        );
        counter!("relay_posts_admitted_total").increment(posts.len() as u64);

        tracing::info!(
            target: "pipeline",
            topic = %topic,
            pages = acc.pages,
            collected = acc.len(),
            admitted = posts.len(),
            min_score = self.config.min_score,
            "listing filtered"
        );

        if posts.is_empty() {
            return Err(PipelineError::NoAdmissiblePosts { topic });
        }
        Ok(Gathered {
            topic,
            pages: acc.pages,
            collected: acc.len(),
            posts,
        })
    }

    /// Sample and render a digest from gathered posts.
    pub fn digest<R: Rng + ?Sized>(
        &self,
        gathered: Gathered,
        rng: &mut R,
    ) -> Result<Digest, PipelineError> {
        let admissible = gathered.posts.len();
        let posts = sample(gathered.posts, self.config.digest_size, rng);
        let entries = posts
            .iter()
            .map(|p| self.template.render(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Digest {
            topic: gathered.topic,
            pages: gathered.pages,
            collected: gathered.collected,
            admissible,
            posts,
            entries,
        })
    }

    /// [`gather`](Self::gather) then [`digest`](Self::digest).
    pub async fn run<R: Rng + Send + ?Sized>(
        &self,
        topic: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Digest, PipelineError> {
        let t0 = Instant::now();
        let res = match self.gather(topic, now).await {
            Ok(g) => self.digest(g, rng),
            Err(e) => Err(e),
        };
        record_pipeline_ms(t0);
        res
    }
}

/// Wall time of one invocation, success or not.
pub(crate) fn record_pipeline_ms(t0: Instant) {
    histogram!("relay_pipeline_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
}
