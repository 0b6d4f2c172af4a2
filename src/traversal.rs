//! Traversal state: which collection is active and which of its images is shown
//!
//! Only the active collection's images are held in memory. Entering another
//! collection lists its directory again, so images added or removed on disk
//! are picked up the next time the collection comes around.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::collection::Collection;
use crate::error::{RotateError, RotateResult};

/// Position of the traversal: both indices are always in range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub collection: usize,
    pub image: usize,
}

/// Where the image cursor lands when a collection is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    First,
    Last,
}

pub struct Traversal {
    collections: Vec<Collection>,
    images: Vec<PathBuf>,
    cursor: Cursor,
    /// Shuffle every freshly entered collection (random mode)
    shuffle_on_load: bool,
    rng: StdRng,
}

impl Traversal {
    /// Validate every collection and select the first one.
    ///
    /// With `start_shuffled` the collection order is randomized first, then the
    /// images of the selected collection.
    pub fn new(collections: Vec<Collection>, start_shuffled: bool, mut rng: StdRng) -> RotateResult<Self> {
        if collections.is_empty() {
            return Err(RotateError::NoCollections);
        }

        let mut listed = Vec::with_capacity(collections.len());
        for collection in collections {
            let images = collection.load_images()?;
            info!(path = %collection.path.display(), images = images.len(), "Loaded collection");
            listed.push((collection, images));
        }

        if start_shuffled {
            listed.shuffle(&mut rng);
        }

        let mut iter = listed.into_iter();
        let (first, mut images) = iter.next().ok_or(RotateError::NoCollections)?;
        if start_shuffled {
            images.shuffle(&mut rng);
        }
        let collections = std::iter::once(first).chain(iter.map(|(c, _)| c)).collect();

        Ok(Self {
            collections,
            images,
            cursor: Cursor::default(),
            shuffle_on_load: start_shuffled,
            rng,
        })
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn current_collection(&self) -> &Collection {
        &self.collections[self.cursor.collection]
    }

    pub fn current_image(&self) -> &Path {
        &self.images[self.cursor.image]
    }

    /// True when there is only one image in total, so moving is a no-op
    fn is_single_image(&self) -> bool {
        self.collections.len() == 1 && self.images.len() == 1
    }

    fn following(&self, index: usize) -> usize {
        (index + 1) % self.collections.len()
    }

    fn preceding(&self, index: usize) -> usize {
        (index + self.collections.len() - 1) % self.collections.len()
    }

    pub fn next_image(&mut self) -> RotateResult<()> {
        if self.cursor.image + 1 < self.images.len() {
            self.cursor.image += 1;
            return Ok(());
        }
        if self.is_single_image() {
            return Ok(());
        }
        self.enter_collection(self.following(self.cursor.collection), Landing::First)
    }

    pub fn previous_image(&mut self) -> RotateResult<()> {
        if self.cursor.image > 0 {
            self.cursor.image -= 1;
            return Ok(());
        }
        if self.is_single_image() {
            return Ok(());
        }
        self.enter_collection(self.preceding(self.cursor.collection), Landing::Last)
    }

    pub fn next_collection(&mut self) -> RotateResult<()> {
        self.enter_collection(self.following(self.cursor.collection), Landing::First)
    }

    pub fn previous_collection(&mut self) -> RotateResult<()> {
        self.enter_collection(self.preceding(self.cursor.collection), Landing::First)
    }

    /// Randomize the images from the cursor (inclusive) to the end; earlier images keep their place
    pub fn shuffle_images(&mut self) {
        let from = self.cursor.image;
        self.images[from..].shuffle(&mut self.rng);
        debug!(from, len = self.images.len(), "Shuffled images");
    }

    /// Randomize the collections from the cursor (inclusive) to the end.
    ///
    /// If a different collection lands under the cursor it becomes the active
    /// one and is loaded. On a load failure the previous order is kept.
    pub fn shuffle_collections(&mut self) -> RotateResult<()> {
        let at = self.cursor.collection;
        let mut reordered = self.collections.clone();
        reordered[at..].shuffle(&mut self.rng);
        debug!(from = at, len = reordered.len(), "Shuffled collections");

        if reordered[at] == self.collections[at] {
            self.collections = reordered;
            return Ok(());
        }

        let images = self.list_for_entry(&reordered[at])?;
        self.collections = reordered;
        self.images = images;
        self.cursor.image = 0;
        info!(path = %self.current_collection().path.display(), "Active collection changed by shuffle");
        Ok(())
    }

    /// Load collection `index` and move the cursor there; nothing changes on failure
    fn enter_collection(&mut self, index: usize, landing: Landing) -> RotateResult<()> {
        let collection = self.collections[index].clone();
        let images = self.list_for_entry(&collection)?;
        let image = match landing {
            Landing::First => 0,
            Landing::Last => images.len() - 1,
        };

        self.images = images;
        self.cursor = Cursor {
            collection: index,
            image,
        };
        info!(
            collection = index,
            path = %self.current_collection().path.display(),
            images = self.images.len(),
            "Entered collection"
        );
        Ok(())
    }

    fn list_for_entry(&mut self, collection: &Collection) -> RotateResult<Vec<PathBuf>> {
        let mut images = collection.load_images()?;
        if self.shuffle_on_load {
            images.shuffle(&mut self.rng);
        }
        Ok(images)
    }
}
