use leptos::*;

use crate::domain::drawing::DrawingTool;

/// One button per drawing tool. The armed tool's button carries `active`;
/// clicking it again disarms it (the controller toggles).
#[component]
pub fn DrawingToolbar(
    #[prop(into)] active: Signal<Option<DrawingTool>>,
    #[prop(into)] on_select: Callback<DrawingTool>,
) -> impl IntoView {
    view! {
        <div class="drawing-toolbar">
            {DrawingTool::all()
                .into_iter()
                .map(|tool| {
                    view! {
                        <button
                            class="drawing-tool-btn"
                            class:active=move || active.get() == Some(tool)
                            data-tool=tool.as_ref().to_string()
                            title=tool.label()
                            on:click=move |_| on_select.call(tool)
                        >
                            {tool.label()}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}
