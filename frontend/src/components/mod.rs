pub mod back_to_top;
pub mod contact_form;
pub mod counter;
pub mod faq;
pub mod nav_menu;
pub mod project_filter;
pub mod slider;
pub mod smooth_scroll;
pub mod toast;
