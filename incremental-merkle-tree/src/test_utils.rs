//! Shared fixtures for tests.

use std::{cell::Cell, rc::Rc};

use sha2::Digest as _;

use crate::{
    Content, Digest, Error, HashStrategy, MerkleTree, NodeHasher, Result, Sha256Hasher,
    Sha256Strategy,
};

/// Tree over [`TestContent`] with the default strategy.
pub(crate) type TestTree = MerkleTree<TestContent>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum TestContentError {
    #[error("refused to hash {0}")]
    Hash(String),
    #[error("refused to compare {0}")]
    Equals(String),
}

/// String content hashed with SHA-256, with switchable failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TestContent {
    pub(crate) data: String,
    pub(crate) fail_hash: bool,
    pub(crate) fail_equals: bool,
}

impl TestContent {
    pub(crate) fn new(data: &str) -> Self {
        TestContent {
            data: data.to_string(),
            fail_hash: false,
            fail_equals: false,
        }
    }

    pub(crate) fn failing_hash(data: &str) -> Self {
        TestContent {
            fail_hash: true,
            ..Self::new(data)
        }
    }

    pub(crate) fn failing_equals(data: &str) -> Self {
        TestContent {
            fail_equals: true,
            ..Self::new(data)
        }
    }
}

impl Content for TestContent {
    type Error = TestContentError;

    fn calculate_hash(&self) -> std::result::Result<Digest, Self::Error> {
        if self.fail_hash {
            return Err(TestContentError::Hash(self.data.clone()));
        }
        Ok(h(&self.data))
    }

    fn equals(&self, other: &Self) -> std::result::Result<bool, Self::Error> {
        if self.fail_equals {
            return Err(TestContentError::Equals(self.data.clone()));
        }
        Ok(self.data == other.data)
    }
}

/// Contents named `"0"`, `"1"`, ... `"{n-1}"`.
pub(crate) fn contents(n: usize) -> Vec<TestContent> {
    (0..n).map(|i| TestContent::new(&i.to_string())).collect()
}

/// Cached root of a fresh build over `contents(n)`.
pub(crate) fn built_root(n: usize) -> Digest {
    let tree = TestTree::build(contents(n)).unwrap().expect("build");
    tree.merkle_root().expect("non-empty").to_vec()
}

/// Root over `leaves` with every odd level, the leaf level included, closed
/// by pairing its last node with itself.
pub(crate) fn paired_root(leaves: &[Digest]) -> Digest {
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| h2(&pair[0], pair.get(1).unwrap_or(&pair[0])))
            .collect();
    }
    level.pop().expect("non-empty")
}

/// Expected root after building `contents(start)` and appending the rest of
/// `contents(total)` one by one without padding.
pub(crate) fn implicit_root(start: usize, total: usize) -> Digest {
    let mut digests: Vec<Digest> = (0..start).map(|i| h(&i.to_string())).collect();
    if start % 2 == 1 {
        digests.push(h(&(start - 1).to_string()));
    }
    digests.extend((start..total).map(|i| h(&i.to_string())));
    paired_root(&digests)
}

/// SHA-256 of a string.
pub(crate) fn h(data: &str) -> Digest {
    sha2::Sha256::digest(data.as_bytes()).to_vec()
}

/// SHA-256 of the concatenation of two digests.
pub(crate) fn h2(left: &[u8], right: &[u8]) -> Digest {
    let mut hasher = sha2::Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().to_vec()
}

/// SHA-256 strategy that refuses input once its write budget is spent.
#[derive(Debug, Clone)]
pub(crate) struct FailingStrategy {
    remaining: Rc<Cell<usize>>,
}

impl FailingStrategy {
    pub(crate) fn new(budget: usize) -> Self {
        FailingStrategy {
            remaining: Rc::new(Cell::new(budget)),
        }
    }

    pub(crate) fn refill(&self, budget: usize) {
        self.remaining.set(budget);
    }
}

pub(crate) struct FailingHasher {
    inner: Sha256Hasher,
    remaining: Rc<Cell<usize>>,
}

impl NodeHasher for FailingHasher {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let left = self.remaining.get();
        if left == 0 {
            return Err(Error::HashWrite("write budget exhausted".to_string()));
        }
        self.remaining.set(left - 1);
        self.inner.write(bytes)
    }

    fn finish(self) -> Digest {
        self.inner.finish()
    }
}

impl HashStrategy for FailingStrategy {
    type Hasher = FailingHasher;

    fn hasher(&self) -> Self::Hasher {
        FailingHasher {
            inner: Sha256Strategy.hasher(),
            remaining: Rc::clone(&self.remaining),
        }
    }

    fn output_len(&self) -> usize {
        Sha256Strategy.output_len()
    }
}
