//! Shared tree builders for uiscope integration tests.

#![allow(dead_code)]

use uiscope::Node;

pub const LIST: &str = "android.widget.ListView";
pub const ROW: &str = "android.widget.LinearLayout";
pub const LABEL: &str = "android.widget.TextView";
pub const SWITCH: &str = "android.widget.Switch";
pub const BUTTON: &str = "android.widget.Button";

/// A settings row: a label plus a switch
pub fn row(label: &str) -> Node {
    Node::new(ROW)
        .child(Node::new(LABEL).with_text(label))
        .child(Node::new(SWITCH).with_resource_id("android:id/switch_widget"))
}

/// Three rows under a list; row 1 is described "Wi-Fi settings"
pub fn settings_screen() -> Node {
    Node::new("android.widget.FrameLayout").child(Node::new(LIST).with_children([
        row("Airplane mode").with_description("Airplane mode toggle"),
        row("Wi-Fi").with_description("Wi-Fi settings"),
        row("Display").with_description("Brightness and theme"),
    ]))
}

/// Rows whose identifying text lives only on a nested button
pub fn form_screen() -> Node {
    Node::new(LIST).with_children([
        Node::new(ROW).child(Node::new(BUTTON).with_text("Cancel")),
        Node::new(ROW).child(
            Node::new("android.widget.FrameLayout").child(Node::new(BUTTON).with_text("Save")),
        ),
    ])
}
