//  Copyright (c) 2020 Christopher Taylor
//
//  Distributed under the Boost Software License, Version 1.0. (See accompanying
//  file LICENSE_1_0.txt or copy at http://www.boost.org/LICENSE_1_0.txt)
//
//! Hyperparameter values swept over and cached.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LdaError;

/// Dirichlet prior: an explicit density or a tag that lets the engine pick
/// its default policy.
///
/// Tags are opaque. They survive the cache verbatim and only turn into a
/// number when the engine resolves them or when a plot needs a coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prior {
    Value(f64),
    Symmetric,
    Asymmetric,
}

impl Prior {
    pub fn value(&self) -> Option<f64> {
        match self {
            Prior::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Display-only coercion: tags collapse onto `placeholder`.
    pub fn plot_coordinate(&self, placeholder: f64) -> f64 {
        self.value().unwrap_or(placeholder)
    }
}

impl fmt::Display for Prior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // shortest representation that parses back to the same bits
            Prior::Value(v) => write!(f, "{}", v),
            Prior::Symmetric => f.write_str("symmetric"),
            Prior::Asymmetric => f.write_str("asymmetric"),
        }
    }
}

impl FromStr for Prior {
    type Err = LdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "symmetric" => Ok(Prior::Symmetric),
            "asymmetric" => Ok(Prior::Asymmetric),
            other => other
                .parse::<f64>()
                .map(Prior::Value)
                .map_err(|_| LdaError::InvalidPrior(other.to_string())),
        }
    }
}

impl From<f64> for Prior {
    fn from(v: f64) -> Self {
        Prior::Value(v)
    }
}

impl Serialize for Prior {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Prior {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// One point of the sweep grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperParams {
    pub topics: usize,
    pub alpha: Prior,
    pub beta: Prior,
}

impl HyperParams {
    pub fn new(topics: usize, alpha: impl Into<Prior>, beta: impl Into<Prior>) -> Self {
        Self {
            topics,
            alpha: alpha.into(),
            beta: beta.into(),
        }
    }
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k={} alpha={} beta={}", self.topics, self.alpha, self.beta)
    }
}
