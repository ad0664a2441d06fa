// SPDX-License-Identifier: MIT

pub mod canvas;
