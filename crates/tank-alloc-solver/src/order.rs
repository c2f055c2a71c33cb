// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

/// Reorders an ascending sequence so that it starts at the middle and alternates outward,
/// lower side first.
///
/// `[1, 2, 3, 4, 5]` becomes `[3, 2, 4, 1, 5]`; `[1, 2, 3, 4]` becomes `[2, 3, 1, 4]`.
pub fn middle_out<T: Copy>(sorted: &[T]) -> Vec<T> {
    let n = sorted.len();
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }

    let (mut lo, mut hi) = if n % 2 == 1 {
        out.push(sorted[n / 2]);
        (n / 2, n / 2 + 1)
    } else {
        (n / 2, n / 2)
    };

    while lo > 0 || hi < n {
        if lo > 0 {
            lo -= 1;
            out.push(sorted[lo]);
        }
        if hi < n {
            out.push(sorted[hi]);
            hi += 1;
        }
    }
    out
}
