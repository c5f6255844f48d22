// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::kurbo::Rect;
use crate::{
    FixedAdvanceShaper, InputItem, Layout, LayoutOptions, PositionAttrs, TextStyle, WrapMode,
    WrapShape,
};

/// Evaluates to the name of the enclosing function.
#[macro_export]
macro_rules! test_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = &name[..name.len() - 3];
        let name = &name[name.rfind(':').map(|x| x + 1).unwrap_or(0)..];

        name
    }};
}

/// Font size of [`TestEnv::style`]. Narrow glyphs advance half of it.
pub(crate) const FONT_SIZE: f64 = 10.0;

pub(crate) struct TestEnv {
    test_name: String,
    pub(crate) shaper: FixedAdvanceShaper,
    options: LayoutOptions,
    shapes: Vec<WrapShape>,
    exclusions: Vec<WrapShape>,
}

impl TestEnv {
    pub(crate) fn new(test_name: &str) -> Self {
        Self {
            test_name: test_name.to_owned(),
            shaper: FixedAdvanceShaper::new().with_common_ligatures(),
            options: LayoutOptions::default(),
            shapes: Vec::new(),
            exclusions: Vec::new(),
        }
    }

    /// The default style: 10 units, so narrow glyphs advance 5 and an
    /// unmodified line is 12.5 tall.
    pub(crate) fn style(&self) -> TextStyle {
        TextStyle::default().with_font_size(FONT_SIZE)
    }

    pub(crate) fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn with_wrap_mode(mut self, wrap_mode: WrapMode) -> Self {
        self.options.wrap_mode = wrap_mode;
        self
    }

    /// Adds a wrap shape and switches to flowing text into shapes.
    pub(crate) fn with_shape(mut self, rect: Rect) -> Self {
        self.shapes.push(WrapShape::rect(rect).unwrap());
        self.options.wrap_mode = WrapMode::ShapeInside;
        self
    }

    pub(crate) fn with_exclusion(mut self, rect: Rect) -> Self {
        self.exclusions.push(WrapShape::rect(rect).unwrap());
        self
    }

    /// An empty layout with this environment's options and shapes.
    pub(crate) fn builder(&self) -> Layout {
        let mut layout = Layout::new();
        layout.set_options(self.options);
        for shape in &self.shapes {
            layout.append_wrap_shape(shape.clone());
        }
        for shape in &self.exclusions {
            layout.append_exclusion(shape.clone());
        }
        layout
    }

    /// Lays out `text` in the default style.
    pub(crate) fn layout(&mut self, text: &str) -> Layout {
        let style = self.style();
        self.layout_styled(text, style, PositionAttrs::default())
    }

    pub(crate) fn layout_styled(
        &mut self,
        text: &str,
        style: TextStyle,
        positions: PositionAttrs,
    ) -> Layout {
        let mut layout = self.builder();
        layout.append_text(text, style, positions);
        self.calculate(&mut layout);
        layout
    }

    pub(crate) fn layout_items(&mut self, items: Vec<InputItem>) -> Layout {
        let mut layout = self.builder();
        for item in items {
            match item {
                InputItem::Text(run) => layout.append_run(run),
                InputItem::Control(code) => layout.append_control_code(code),
            }
        }
        self.calculate(&mut layout);
        layout
    }

    pub(crate) fn calculate(&mut self, layout: &mut Layout) {
        assert!(
            layout.calculate(&mut self.shaper),
            "{} produced no lines",
            self.test_name
        );
    }

    /// Name of a check within the current test.
    pub(crate) fn case(&self, case: &str) -> String {
        format!("{}::{case}", self.test_name)
    }
}
