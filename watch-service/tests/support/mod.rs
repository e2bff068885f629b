#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use watch_core::{ContentSource, CoreError, RedditComment, RedditPost};
use watch_service::{MonitorEvent, OutputSink};

pub fn post(id: &str, title: &str, body: &str) -> RedditPost {
    RedditPost {
        id: id.to_string(),
        title: title.to_string(),
        permalink: format!("https://www.reddit.com/r/rust/comments/{}/post/", id),
        author: Some("ferris".to_string()),
        score: 1,
        created_utc: 1700000000,
        body: body.to_string(),
    }
}

pub fn comment(id: &str, body: &str) -> RedditComment {
    RedditComment {
        id: id.to_string(),
        permalink: format!("https://www.reddit.com/r/rust/comments/x/post/{}/", id),
        author: Some("crab".to_string()),
        score: 2,
        created_utc: 1700000100,
        body: body.to_string(),
    }
}

/// Scripted content source. List failures are handed out first-in first-out,
/// one per call, before the posts are served.
#[derive(Default)]
pub struct FakeSource {
    posts: Vec<RedditPost>,
    comments: HashMap<String, Vec<RedditComment>>,
    list_failures: Mutex<VecDeque<CoreError>>,
    comment_failures: HashMap<String, fn() -> CoreError>,
    comment_delay: Duration,
    ignore_limit: bool,
    pub list_calls: Arc<AtomicUsize>,
    pub comment_calls: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new(posts: Vec<RedditPost>) -> Self {
        Self {
            posts,
            ..Self::default()
        }
    }

    pub fn with_comments(mut self, post_id: &str, comments: Vec<RedditComment>) -> Self {
        self.comments.insert(post_id.to_string(), comments);
        self
    }

    pub fn failing_first(self, failures: Vec<CoreError>) -> Self {
        *self.list_failures.lock().unwrap() = failures.into();
        self
    }

    pub fn failing_comments_for(mut self, post_id: &str, error: fn() -> CoreError) -> Self {
        self.comment_failures.insert(post_id.to_string(), error);
        self
    }

    pub fn with_comment_delay(mut self, delay: Duration) -> Self {
        self.comment_delay = delay;
        self
    }

    pub fn ignoring_limit(mut self) -> Self {
        self.ignore_limit = true;
        self
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn list_recent_posts(
        &self,
        _subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPost>, CoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.list_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        if self.ignore_limit {
            return Ok(self.posts.clone());
        }
        Ok(self.posts.iter().take(limit as usize).cloned().collect())
    }

    async fn expanded_comments(&self, post: &RedditPost) -> Result<Vec<RedditComment>, CoreError> {
        self.comment_calls.fetch_add(1, Ordering::SeqCst);
        if !self.comment_delay.is_zero() {
            tokio::time::sleep(self.comment_delay).await;
        }
        if let Some(error) = self.comment_failures.get(&post.id) {
            return Err(error());
        }
        Ok(self.comments.get(&post.id).cloned().unwrap_or_default())
    }
}

/// Collects events and cancels the monitor once enough clean reports arrived.
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<MonitorEvent>>>,
    cancel: CancellationToken,
    stop_after_clean_reports: usize,
    clean_reports: usize,
    failing_reports: usize,
}

impl RecordingSink {
    pub fn new(cancel: CancellationToken, stop_after_clean_reports: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            cancel,
            stop_after_clean_reports,
            clean_reports: 0,
            failing_reports: 0,
        }
    }

    /// The first `count` cycle reports fail to be written.
    pub fn failing_reports(mut self, count: usize) -> Self {
        self.failing_reports = count;
        self
    }
}

impl OutputSink for RecordingSink {
    fn emit(&mut self, event: &MonitorEvent) -> Result<(), CoreError> {
        if let MonitorEvent::CycleCompleted(report) = event {
            if self.failing_reports > 0 {
                self.failing_reports -= 1;
                return Err(CoreError::Output(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "output closed",
                )));
            }
            if report.error.is_none() {
                self.clean_reports += 1;
                if self.clean_reports >= self.stop_after_clean_reports {
                    self.cancel.cancel();
                }
            }
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
