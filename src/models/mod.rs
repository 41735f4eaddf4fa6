pub mod schedule;
pub mod task;
pub mod user;

use serde::{Deserialize, Serialize};

pub use schedule::{
    ClassSchedule, DayOfWeek, ScheduleCreatedResponse, ScheduleFormError, SchedulePayload,
    WeeklyScheduleResponse,
};
pub use task::{Attachment, Priority, Task, TaskDraft, TaskFormError, TaskStatus};
pub use user::{
    ChangePasswordRequest, DeleteAccountRequest, ForgotPasswordRequest, LoginRequest,
    LoginResponse, PhotoResponse, PublicUser, RegisterRequest, RegisterResponse,
    UpdateEmailRequest, UpdatePhotoRequest, UpdateProfileRequest, User, UserResponse,
};

/// Body of endpoints that confirm an action without returning data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
