use std::ops::Range;

use crate::error::{Error, Result};

/// All trainable parameters of a one-hidden-layer network packed into a single
/// allocation.
///
/// Layout (fixed, the model file depends on it):
///
/// ```text
/// [ W_in : input*hidden | B_hidden : hidden | A_hidden : hidden | W_out : hidden ]
/// ```
///
/// `W_in` is column-major by hidden unit: the weight from input `j` to hidden
/// unit `i` lives at `j * hidden_size + i`. `A_hidden` is scratch space holding
/// the post-sigmoid activations of the most recent forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBuffer {
    input_size: usize,
    hidden_size: usize,
    data: Vec<f64>,
    w_in: Range<usize>,
    b_hidden: Range<usize>,
    a_hidden: Range<usize>,
    w_out: Range<usize>,
}

/// Simultaneous mutable borrows of the four regions.
pub struct Regions<'a> {
    pub w_in: &'a mut [f64],
    pub b_hidden: &'a mut [f64],
    pub a_hidden: &'a mut [f64],
    pub w_out: &'a mut [f64],
}

impl ParameterBuffer {
    /// Number of `f64` slots needed for the given shape, `hidden * (input + 3)`.
    pub fn slots_for(input_size: usize, hidden_size: usize) -> Option<usize> {
        input_size.checked_add(3)?.checked_mul(hidden_size)
    }

    /// Allocates a zeroed buffer.
    pub fn zeros(input_size: usize, hidden_size: usize) -> Result<Self> {
        let len = Self::checked_len(input_size, hidden_size)?;
        Self::from_vec(input_size, hidden_size, vec![0.0; len])
    }

    /// Wraps an existing flat buffer laid out as `W_in, B_hidden, A_hidden, W_out`.
    pub fn from_vec(input_size: usize, hidden_size: usize, data: Vec<f64>) -> Result<Self> {
        let len = Self::checked_len(input_size, hidden_size)?;
        if data.len() != len {
            return Err(Error::DimensionMismatch {
                expected: len,
                actual: data.len(),
            });
        }

        let w_in_end = input_size * hidden_size;
        let b_hidden_end = w_in_end + hidden_size;
        let a_hidden_end = b_hidden_end + hidden_size;

        Ok(Self {
            input_size,
            hidden_size,
            data,
            w_in: 0..w_in_end,
            b_hidden: w_in_end..b_hidden_end,
            a_hidden: b_hidden_end..a_hidden_end,
            w_out: a_hidden_end..len,
        })
    }

    fn checked_len(input_size: usize, hidden_size: usize) -> Result<usize> {
        if input_size == 0 || hidden_size == 0 {
            return Err(Error::InvalidConfig(format!(
                "input_size and hidden_size must be > 0, got {input_size} and {hidden_size}"
            )));
        }
        Self::slots_for(input_size, hidden_size).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "parameter buffer for {input_size}x{hidden_size} overflows usize"
            ))
        })
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The whole packed buffer, in on-disk order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn w_in(&self) -> &[f64] {
        &self.data[self.w_in.clone()]
    }

    #[inline]
    pub fn b_hidden(&self) -> &[f64] {
        &self.data[self.b_hidden.clone()]
    }

    #[inline]
    pub fn a_hidden(&self) -> &[f64] {
        &self.data[self.a_hidden.clone()]
    }

    #[inline]
    pub fn w_out(&self) -> &[f64] {
        &self.data[self.w_out.clone()]
    }

    #[inline]
    pub fn w_in_mut(&mut self) -> &mut [f64] {
        &mut self.data[self.w_in.clone()]
    }

    #[inline]
    pub fn w_out_mut(&mut self) -> &mut [f64] {
        &mut self.data[self.w_out.clone()]
    }

    /// Splits the buffer into its four regions at the offsets fixed at construction.
    pub fn regions_mut(&mut self) -> Regions<'_> {
        let (w_in, rest) = self.data.split_at_mut(self.b_hidden.start);
        let (b_hidden, rest) = rest.split_at_mut(self.hidden_size);
        let (a_hidden, w_out) = rest.split_at_mut(self.hidden_size);
        Regions {
            w_in,
            b_hidden,
            a_hidden,
            w_out,
        }
    }

    /// Zeros the `A_hidden` scratch region.
    pub fn clear_scratch(&mut self) {
        let range = self.a_hidden.clone();
        self.data[range].fill(0.0);
    }

    /// Compares everything except the scratch region, bit for bit.
    pub fn same_parameters(&self, other: &ParameterBuffer) -> bool {
        let bits_eq = |a: &[f64], b: &[f64]| {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
        };
        self.input_size == other.input_size
            && self.hidden_size == other.hidden_size
            && bits_eq(self.w_in(), other.w_in())
            && bits_eq(self.b_hidden(), other.b_hidden())
            && bits_eq(self.w_out(), other.w_out())
    }
}
